//! Structured logging with an asynchronous file-backed sink
//!
//! This crate provides leveled (info/error) logging with:
//! - JSON or delimited plain-text encoding of records
//! - Console output or per-name log files
//! - Non-blocking file writes behind a bounded queue and a single drain task
//! - Deterministic drain-then-close shutdown, with late writes redirected to
//!   a diagnostic fallback stream instead of being dropped
//!
//! All state lives in an injectable [`Logging`] context owned by the
//! application entry point; configuration loads are first-wins so
//! independent subsystems can initialize logging without clobbering each
//! other.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod console;
mod diag;
mod encode;
mod error;
mod file;
mod level;
mod logging;
mod macros;
mod record;
mod registry;
mod sink;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{Encoding, LogConfig, LogConfigBuilder, Mode};
pub use console::ConsoleSink;
pub use diag::Diagnostics;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use file::{FileSink, QUEUE_CAPACITY};
pub use level::Level;
pub use logging::{FileLogger, Logging};
pub use record::{Caller, Payload, Record};
pub use sink::Sink;
