//! Logging configuration consumed by [`Logging::load`](crate::Logging::load)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Level;

pub(crate) const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
pub(crate) const DEFAULT_PLAIN_SEP: &str = "\t";
pub(crate) const DEFAULT_LOG_PATH: &str = "logs";

/// Where log output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Write to process stdout
    #[default]
    Console,
    /// Write to a file under [`LogConfig::path`]
    File,
}

/// How records are rendered to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One JSON object per line
    #[default]
    Json,
    /// Separator-delimited plain text
    Plain,
}

impl Encoding {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Plain,
            _ => Self::Json,
        }
    }
}

/// Logging configuration.
///
/// Every field has a default, so partial configs deserialize cleanly and a
/// `LogConfig::default()` is a working console setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LogConfig {
    /// Output destination
    pub mode: Mode,
    /// Record encoding
    pub encoding: Encoding,
    /// Field separator for plain encoding
    pub plain_sep: String,
    /// Wrap the level field in ANSI colors (plain encoding only)
    pub color: bool,
    /// chrono format string for timestamps; `None` keeps the default
    /// `%Y-%m-%dT%H:%M:%S%.3f%:z`
    pub time_format: Option<String>,
    /// Directory holding file-mode logs
    pub path: PathBuf,
    /// Minimum level that is emitted
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Console,
            encoding: Encoding::Json,
            plain_sep: DEFAULT_PLAIN_SEP.to_string(),
            color: false,
            time_format: None,
            path: PathBuf::from(DEFAULT_LOG_PATH),
            level: Level::Info,
        }
    }
}

impl LogConfig {
    /// Returns a builder with the defaults applied.
    #[must_use]
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

/// Builder for [`LogConfig`].
#[derive(Debug, Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    /// Sets the output destination.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sets the record encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// Sets the plain-encoding field separator.
    #[must_use]
    pub fn plain_sep(mut self, sep: impl Into<String>) -> Self {
        self.config.plain_sep = sep.into();
        self
    }

    /// Enables or disables level colorization.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Sets a custom chrono timestamp format.
    #[must_use]
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.config.time_format = Some(format.into());
        self
    }

    /// Sets the directory holding file-mode logs.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Sets the minimum emitted level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> LogConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_console_json_info() {
        let config = LogConfig::default();
        assert_eq!(config.mode, Mode::Console);
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.plain_sep, "\t");
        assert!(!config.color);
        assert_eq!(config.path, PathBuf::from("logs"));
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = LogConfig::builder()
            .mode(Mode::File)
            .encoding(Encoding::Plain)
            .plain_sep("|")
            .color(true)
            .path("/var/log/app")
            .level(Level::Error)
            .build();
        assert_eq!(config.mode, Mode::File);
        assert_eq!(config.encoding, Encoding::Plain);
        assert_eq!(config.plain_sep, "|");
        assert!(config.color);
        assert_eq!(config.path, PathBuf::from("/var/log/app"));
        assert_eq!(config.level, Level::Error);
    }

    #[test]
    fn partial_configs_deserialize_with_defaults() {
        let config: LogConfig =
            serde_json::from_str(r#"{"mode": "file", "level": "error"}"#).unwrap();
        assert_eq!(config.mode, Mode::File);
        assert_eq!(config.level, Level::Error);
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.path, PathBuf::from("logs"));
    }

    #[test]
    fn encoding_flag_round_trips_through_u8() {
        assert_eq!(Encoding::from_u8(Encoding::Json.as_u8()), Encoding::Json);
        assert_eq!(Encoding::from_u8(Encoding::Plain.as_u8()), Encoding::Plain);
    }
}
