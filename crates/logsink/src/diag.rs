//! Diagnostic fallback stream
//!
//! Last-resort destination for output that can no longer reach its sink:
//! writes racing a close, payloads that fail to encode, and drain-side write
//! errors. Defaults to stderr so nothing is silently dropped.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Cheaply-cloneable handle to the fallback stream.
///
/// A context owns one handle and clones it into every sink it constructs, so
/// all fallback output converges on a single stream.
#[derive(Clone)]
pub struct Diagnostics {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Diagnostics {
    /// A handle writing to process stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    /// A handle writing to an arbitrary stream.
    #[must_use]
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    /// Writes one entry to the stream, newline terminated. Best-effort.
    pub(crate) fn emit(&self, data: &[u8]) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(data);
            if !data.ends_with(b"\n") {
                let _ = out.write_all(b"\n");
            }
            let _ = out.flush();
        }
    }

    pub(crate) fn emit_str(&self, message: &str) {
        self.emit(message.as_bytes());
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_terminates_lines() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = crate::test_support::SharedWriter(buffer.clone());
        let diagnostics = Diagnostics::with_writer(Box::new(writer));

        diagnostics.emit(b"no newline");
        diagnostics.emit(b"with newline\n");

        let written = buffer.lock().unwrap();
        assert_eq!(&written[..], b"no newline\nwith newline\n");
    }
}
