//! Rendering records to bytes in JSON or plain form

use std::io::Write;

use bytes::Bytes;
use serde_json::{Map, Value};
use termcolor::{Ansi, Color, ColorSpec, WriteColor};

use crate::Result;
use crate::config::{DEFAULT_PLAIN_SEP, DEFAULT_TIME_FORMAT, Encoding, LogConfig};
use crate::level::Level;
use crate::record::{Payload, Record};

const TIMESTAMP_KEY: &str = "@timestamp";
const LEVEL_KEY: &str = "level";
const CONTENT_KEY: &str = "content";
const CALLER_KEY: &str = "caller";

/// Renders records to bytes.
///
/// Separator, timestamp format, and colorization are fixed at configuration
/// time; the JSON/plain choice is passed per call so it can be swapped
/// through the context's atomic flag.
#[derive(Debug, Clone)]
pub struct Encoder {
    time_format: String,
    plain_sep: String,
    color: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            plain_sep: DEFAULT_PLAIN_SEP.to_string(),
            color: false,
        }
    }
}

impl Encoder {
    /// Builds an encoder from the separator, timestamp, and color settings
    /// of `config`.
    #[must_use]
    pub fn from_config(config: &LogConfig) -> Self {
        Self {
            time_format: config
                .time_format
                .clone()
                .unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string()),
            plain_sep: config.plain_sep.clone(),
            color: config.color,
        }
    }

    /// Encodes `record` in the requested encoding, newline terminated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Encoding`] when the payload cannot be
    /// serialized; no output is produced in that case.
    pub fn encode(&self, encoding: Encoding, record: &Record) -> Result<Bytes> {
        match encoding {
            Encoding::Json => self.encode_json(record),
            Encoding::Plain => self.encode_plain(record),
        }
    }

    fn timestamp(&self, record: &Record) -> String {
        record.timestamp.format(&self.time_format).to_string()
    }

    fn encode_json(&self, record: &Record) -> Result<Bytes> {
        let content = match &record.payload {
            Payload::Text(text) => Value::String(text.clone()),
            Payload::Value(value) => value.clone(),
        };

        let mut entry = Map::new();
        entry.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(self.timestamp(record)),
        );
        entry.insert(
            LEVEL_KEY.to_string(),
            Value::String(record.level.to_string()),
        );
        entry.insert(CONTENT_KEY.to_string(), content);
        entry.insert(CALLER_KEY.to_string(), Value::String(caller_of(record)));

        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        Ok(Bytes::from(line))
    }

    fn encode_plain(&self, record: &Record) -> Result<Bytes> {
        let message = match &record.payload {
            Payload::Text(text) => text.clone(),
            Payload::Value(value) => serde_json::to_string(value)?,
        };

        let level = if self.color {
            wrap_level_with_color(record.level)?
        } else {
            record.level.to_string()
        };

        let mut line = String::new();
        line.push_str(&self.timestamp(record));
        line.push_str(&self.plain_sep);
        line.push_str(&level);
        line.push_str(&self.plain_sep);
        line.push_str(&message);
        line.push_str(&self.plain_sep);
        line.push_str(CALLER_KEY);
        line.push('=');
        line.push_str(&caller_of(record));
        line.push('\n');
        Ok(Bytes::from(line))
    }
}

fn caller_of(record: &Record) -> String {
    record.caller.map(|c| c.to_string()).unwrap_or_default()
}

fn wrap_level_with_color(level: Level) -> Result<String> {
    let color = match level {
        Level::Error => Color::Red,
        Level::Info => Color::Blue,
    };

    let mut ansi = Ansi::new(Vec::new());
    ansi.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(ansi, "{level}")?;
    ansi.reset()?;

    let wrapped = ansi.into_inner();
    Ok(String::from_utf8_lossy(&wrapped).into_owned())
}
