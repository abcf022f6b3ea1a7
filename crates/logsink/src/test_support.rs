//! In-memory sinks and streams for tests
//!
//! Available to downstream crates through the `test-support` feature.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;
use crate::diag::Diagnostics;
use crate::sink::Sink;

/// Sink that records every write in memory.
#[derive(Clone, Default)]
pub struct CaptureSink {
    written: Arc<Mutex<Vec<u8>>>,
}

impl CaptureSink {
    /// Creates an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }

    /// Whether any write contained `text`.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.contents().contains(text)
    }

    /// Discards everything captured so far.
    pub fn clear(&self) {
        self.written.lock().unwrap().clear();
    }
}

#[async_trait]
impl Sink for CaptureSink {
    async fn write(&self, data: Bytes) -> Result<usize> {
        self.written.lock().unwrap().extend_from_slice(&data);
        Ok(data.len())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// `io::Write` adapter over a shared buffer, for capturing diagnostics.
pub struct SharedWriter(pub Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A diagnostics handle captured in memory, plus its read side.
#[must_use]
pub fn capture_diagnostics() -> (Diagnostics, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = Diagnostics::with_writer(Box::new(SharedWriter(buffer.clone())));
    (diagnostics, buffer)
}
