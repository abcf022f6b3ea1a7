//! The active-sink slot

use std::sync::{Arc, RwLock};

use crate::sink::Sink;

/// Slot holding the currently active sink of a context.
///
/// Readers share the lock; `store`/`swap` take it exclusively. Detached
/// sinks are handed back to the caller, who owns closing them.
#[derive(Default)]
pub(crate) struct SinkSlot {
    slot: RwLock<Option<Arc<dyn Sink>>>,
}

impl SinkSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The active sink, if any.
    pub(crate) fn load(&self) -> Option<Arc<dyn Sink>> {
        self.slot.read().ok().and_then(|guard| guard.clone())
    }

    /// Unconditionally replaces the active sink.
    pub(crate) fn store(&self, sink: Arc<dyn Sink>) {
        if let Ok(mut guard) = self.slot.write() {
            *guard = Some(sink);
        }
    }

    /// Replaces the active sink, returning the previous one.
    pub(crate) fn swap(&self, sink: Option<Arc<dyn Sink>>) -> Option<Arc<dyn Sink>> {
        match self.slot.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, sink),
            Err(_) => None,
        }
    }

    /// Installs `sink` only when the slot is empty, returning whichever sink
    /// is active afterwards.
    pub(crate) fn store_if_none(&self, sink: Arc<dyn Sink>) -> Arc<dyn Sink> {
        match self.slot.write() {
            Ok(mut guard) => guard.get_or_insert(sink).clone(),
            Err(_) => sink,
        }
    }
}
