//! Formatting macros over a [`Logging`](crate::Logging) context
//!
//! Both macros expand to the corresponding facade call and hand back its
//! future:
//!
//! ```ignore
//! logsink::info!(logging, "listening on {addr}").await;
//! logsink::error!(logging, "lost connection: {err}").await;
//! ```

/// Formats and logs at info level.
#[macro_export]
macro_rules! info {
    ($logging:expr, $($arg:tt)+) => {
        $logging.info(::std::format!($($arg)+))
    };
}

/// Formats and logs at error level.
#[macro_export]
macro_rules! error {
    ($logging:expr, $($arg:tt)+) => {
        $logging.error(::std::format!($($arg)+))
    };
}
