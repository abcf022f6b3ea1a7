//! The byte-level sink seam

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// A destination that durably persists encoded log output.
///
/// Sinks consume fully-encoded entries; the encoding choice lives upstream
/// so a sink never needs to know the wire format.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Queues one encoded entry for persistence, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SinkClosed`] when the sink is shutting down;
    /// the entry is redirected to the diagnostic fallback rather than
    /// dropped.
    async fn write(&self, data: Bytes) -> Result<usize>;

    /// Closes the sink, flushing anything buffered.
    ///
    /// # Errors
    ///
    /// Returns the flush or close error observed by the first close call;
    /// closing an already-closed sink succeeds.
    async fn close(&self) -> Result<()>;
}
