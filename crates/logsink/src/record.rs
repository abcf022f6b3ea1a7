//! Log records, payloads, and call-site capture

use std::fmt;
use std::panic::Location;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::{Level, Result};

/// The opaque payload of a record.
///
/// The original dynamic type switch becomes an explicit tagged union:
/// anything displayable arrives as `Text` (plain strings, stringifiable
/// values, error messages), while arbitrary serializable values are converted
/// up front with [`Payload::try_value`] and carried through JSON encoding
/// intact.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An already-stringified message
    Text(String),
    /// A structured value
    Value(Value),
}

impl Payload {
    /// Converts any serializable value into a structured payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Encoding`] when the value has no JSON
    /// representation (non-string map keys, non-finite floats, and similar).
    pub fn try_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Source location of a log call.
///
/// Captured with `#[track_caller]` at the public entry points, so it names
/// the original call site rather than an internal helper frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    file: &'static str,
    line: u32,
}

impl Caller {
    /// Captures the caller of the surrounding `#[track_caller]` function.
    #[track_caller]
    #[must_use]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Caller {
    /// Renders as `file:line`, keeping at most the last two path components.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self.file.rmatch_indices('/').nth(1) {
            Some((idx, _)) => &self.file[idx + 1..],
            None => self.file,
        };
        write!(f, "{}:{}", short, self.line)
    }
}

/// A single log record.
///
/// Built by the facade, consumed by the encoder, and gone as soon as the
/// encoded bytes are handed to a sink.
#[derive(Debug, Clone)]
pub struct Record {
    /// When the record was created
    pub timestamp: DateTime<Local>,
    /// Severity
    pub level: Level,
    /// Opaque payload
    pub payload: Payload,
    /// Originating call site, when captured
    pub caller: Option<Caller>,
}

impl Record {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn new(level: Level, payload: Payload) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            payload,
            caller: None,
        }
    }

    /// Builder-style method for setting the call site.
    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_keeps_last_two_path_components() {
        let caller = Caller {
            file: "src/net/server.rs",
            line: 42,
        };
        assert_eq!(caller.to_string(), "net/server.rs:42");
    }

    #[test]
    fn shallow_paths_stay_whole() {
        let caller = Caller {
            file: "src/main.rs",
            line: 7,
        };
        assert_eq!(caller.to_string(), "src/main.rs:7");

        let caller = Caller {
            file: "main.rs",
            line: 7,
        };
        assert_eq!(caller.to_string(), "main.rs:7");
    }

    #[test]
    fn here_points_at_this_file() {
        let caller = Caller::here();
        assert!(caller.to_string().contains("record.rs:"));
    }

    #[test]
    fn payload_conversions() {
        assert_eq!(Payload::from("hi"), Payload::Text("hi".to_string()));
        assert_eq!(
            Payload::try_value(&5u32).unwrap(),
            Payload::Value(Value::from(5u32))
        );
    }
}
