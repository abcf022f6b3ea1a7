//! Log levels and the minimum-severity filter

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Severity of a log record.
///
/// Declaration order is severity order; the threshold comparison in
/// [`LevelFilter`] relies on it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Routine informational output
    #[default]
    Info,
    /// Failures worth operator attention
    Error,
}

impl Level {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free minimum-severity gate shared by every handle of a context.
///
/// Setting the threshold takes effect for subsequent calls only; records
/// already handed to a sink are unaffected.
#[derive(Debug)]
pub(crate) struct LevelFilter {
    threshold: AtomicU32,
}

impl LevelFilter {
    pub(crate) const fn new(level: Level) -> Self {
        Self {
            threshold: AtomicU32::new(level as u32),
        }
    }

    pub(crate) fn set(&self, level: Level) {
        self.threshold.store(level as u32, Ordering::Relaxed);
    }

    pub(crate) fn should_log(&self, level: Level) -> bool {
        level as u32 >= self.threshold.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_orders_below_error() {
        assert!(Level::Info < Level::Error);
    }

    #[test]
    fn default_threshold_emits_everything() {
        let filter = LevelFilter::new(Level::Info);
        assert!(filter.should_log(Level::Info));
        assert!(filter.should_log(Level::Error));
    }

    #[test]
    fn raised_threshold_suppresses_info() {
        let filter = LevelFilter::new(Level::Info);
        filter.set(Level::Error);
        assert!(!filter.should_log(Level::Info));
        assert!(filter.should_log(Level::Error));
    }

    #[test]
    fn levels_render_lowercase() {
        assert_eq!(Level::Info.to_string(), "info");
        assert_eq!(Level::Error.to_string(), "error");
        assert_eq!(serde_json::to_string(&Level::Error).unwrap(), "\"error\"");
    }
}
