//! Console sink writing to process stdout

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{self, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::Result;
use crate::sink::Sink;

/// Sink that writes entries to stdout.
///
/// The handle is held behind a lock so concurrent entries never interleave.
#[derive(Debug)]
pub struct ConsoleSink {
    stdout: Mutex<Stdout>,
}

impl ConsoleSink {
    /// Creates a sink over the process stdout handle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn write(&self, data: Bytes) -> Result<usize> {
        let mut stdout = self.stdout.lock().await;
        stdout.write_all(&data).await?;
        stdout.flush().await?;
        Ok(data.len())
    }

    async fn close(&self) -> Result<()> {
        self.stdout.lock().await.flush().await?;
        Ok(())
    }
}
