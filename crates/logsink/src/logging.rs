//! The logging facade
//!
//! [`Logging`] is the injectable context owned by the application entry
//! point. It carries the level threshold, the encoding flag, the encoder
//! settings, the active sink, and the diagnostic fallback; handles are cheap
//! to clone and share one state, so there are no ambient globals.

use std::backtrace::Backtrace;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::{DEFAULT_LOG_PATH, DEFAULT_PLAIN_SEP, Encoding, LogConfig, Mode};
use crate::console::ConsoleSink;
use crate::diag::Diagnostics;
use crate::encode::Encoder;
use crate::file::FileSink;
use crate::level::{Level, LevelFilter};
use crate::record::{Caller, Payload, Record};
use crate::registry::SinkSlot;
use crate::sink::Sink;
use crate::{Error, Result};

/// File stem used for the sink installed by `mode = file` configuration.
const DEFAULT_FILE_STEM: &str = "logsink";
const LOG_EXTENSION: &str = "log";

/// Shared state behind every [`Logging`] clone.
struct Shared {
    filter: LevelFilter,
    encoding: AtomicU8,
    encoder: RwLock<Encoder>,
    slot: SinkSlot,
    diagnostics: Diagnostics,
    load_guard: Mutex<bool>,
    loaded_config: RwLock<Option<LogConfig>>,
}

/// Cheaply-cloneable logging context.
#[derive(Clone)]
pub struct Logging {
    shared: Arc<Shared>,
}

impl Logging {
    /// Creates a context with default settings (console, JSON, info level)
    /// and a stderr diagnostic fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::with_diagnostics(Diagnostics::stderr())
    }

    /// Creates a context routing fallback output to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            shared: Arc::new(Shared {
                filter: LevelFilter::new(Level::Info),
                encoding: AtomicU8::new(Encoding::Json.as_u8()),
                encoder: RwLock::new(Encoder::default()),
                slot: SinkSlot::new(),
                diagnostics,
                load_guard: Mutex::new(false),
                loaded_config: RwLock::new(None),
            }),
        }
    }

    /// Applies `config` to this context and installs the configured sink.
    ///
    /// Only the first call has any effect, so independent subsystems can
    /// initialize logging without clobbering each other; concurrent callers
    /// wait for the winner to finish. Repeated calls succeed without doing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns an error when file mode is configured and the log file cannot
    /// be opened.
    pub async fn load(&self, config: LogConfig) -> Result<()> {
        let mut loaded = self.shared.load_guard.lock().await;
        if *loaded {
            return Ok(());
        }
        *loaded = true;

        let config = normalize(config);

        self.shared.filter.set(config.level);
        self.shared
            .encoding
            .store(config.encoding.as_u8(), Ordering::Relaxed);
        if let Ok(mut encoder) = self.shared.encoder.write() {
            *encoder = Encoder::from_config(&config);
        }

        let sink: Arc<dyn Sink> = match config.mode {
            Mode::File => {
                let path = config
                    .path
                    .join(format!("{DEFAULT_FILE_STEM}.{LOG_EXTENSION}"));
                Arc::new(FileSink::new(path, self.shared.diagnostics.clone()).await?)
            }
            Mode::Console => Arc::new(ConsoleSink::new()),
        };
        self.shared.slot.store(sink);

        if let Ok(mut slot) = self.shared.loaded_config.write() {
            *slot = Some(config);
        }

        Ok(())
    }

    /// Logs `message` at info level.
    ///
    /// A no-op when filtered out; the encoder never runs. Sink failures are
    /// redirected to the diagnostic fallback, never surfaced here.
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        let caller = Caller::here();
        let message = message.into();
        async move {
            if !self.shared.filter.should_log(Level::Info) {
                return;
            }
            self.dispatch(Level::Info, Payload::Text(message), caller)
                .await;
        }
    }

    /// Logs `message` at error level, appending a captured backtrace so the
    /// record carries its call stack.
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        let caller = Caller::here();
        let message = message.into();
        async move {
            if !self.shared.filter.should_log(Level::Error) {
                return;
            }
            self.dispatch(Level::Error, Payload::Text(with_backtrace(message)), caller)
                .await;
        }
    }

    /// Logs a structured payload at info level.
    ///
    /// Serialization failures go to the diagnostic fallback and produce no
    /// output; the call itself never fails.
    #[track_caller]
    pub fn info_value<'a, T: Serialize + Sync>(
        &'a self,
        value: &'a T,
    ) -> impl Future<Output = ()> + Send + 'a {
        let caller = Caller::here();
        async move {
            if !self.shared.filter.should_log(Level::Info) {
                return;
            }
            match Payload::try_value(value) {
                Ok(payload) => self.dispatch(Level::Info, payload, caller).await,
                Err(error) => self.shared.diagnostics.emit_str(&error.to_string()),
            }
        }
    }

    /// Logs a structured payload at error level.
    ///
    /// Serialization failures go to the diagnostic fallback and produce no
    /// output; the call itself never fails.
    #[track_caller]
    pub fn error_value<'a, T: Serialize + Sync>(
        &'a self,
        value: &'a T,
    ) -> impl Future<Output = ()> + Send + 'a {
        let caller = Caller::here();
        async move {
            if !self.shared.filter.should_log(Level::Error) {
                return;
            }
            match Payload::try_value(value) {
                Ok(payload) => self.dispatch(Level::Error, payload, caller).await,
                Err(error) => self.shared.diagnostics.emit_str(&error.to_string()),
            }
        }
    }

    /// Changes the minimum emitted level, effective immediately for
    /// subsequent calls.
    pub fn set_level(&self, level: Level) {
        self.shared.filter.set(level);
    }

    /// Whether a record at `level` would currently be emitted.
    #[must_use]
    pub fn should_log(&self, level: Level) -> bool {
        self.shared.filter.should_log(level)
    }

    /// Replaces the active sink. The previous sink is dropped without being
    /// closed; use [`Logging::swap_sink`] to take ownership of it instead.
    pub fn set_sink(&self, sink: Arc<dyn Sink>) {
        self.shared.slot.store(sink);
    }

    /// Replaces the active sink and returns the previous one, which the
    /// caller now owns, including closing it.
    pub fn swap_sink(&self, sink: Option<Arc<dyn Sink>>) -> Option<Arc<dyn Sink>> {
        self.shared.slot.swap(sink)
    }

    /// Detaches the active sink and closes it.
    ///
    /// # Errors
    ///
    /// Returns the flush or close error from the detached sink.
    pub async fn close(&self) -> Result<()> {
        match self.shared.slot.swap(None) {
            Some(sink) => sink.close().await,
            None => Ok(()),
        }
    }

    /// Creates a logger writing to `<path>/<name>.log`, sharing this
    /// context's level filter and encoder settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotSet`] before [`Logging::load`] has run, or
    /// the I/O error from opening the file.
    pub async fn file_logger(&self, name: &str) -> Result<FileLogger> {
        let path = {
            let Ok(config) = self.shared.loaded_config.read() else {
                return Err(Error::ConfigNotSet);
            };
            let Some(config) = config.as_ref() else {
                return Err(Error::ConfigNotSet);
            };
            config.path.join(format!("{name}.{LOG_EXTENSION}"))
        };

        let sink = FileSink::new(path, self.shared.diagnostics.clone()).await?;
        Ok(FileLogger {
            context: self.clone(),
            sink: Arc::new(sink),
        })
    }

    /// The active sink, installing the lazy console default when none is
    /// set. Exactly one default ever installs, even under concurrent first
    /// access.
    fn current_sink(&self) -> Arc<dyn Sink> {
        match self.shared.slot.load() {
            Some(sink) => sink,
            None => self.shared.slot.store_if_none(Arc::new(ConsoleSink::new())),
        }
    }

    fn encoding(&self) -> Encoding {
        Encoding::from_u8(self.shared.encoding.load(Ordering::Relaxed))
    }

    /// Encodes `record` per the current settings; encoding failures go to
    /// diagnostics and yield `None`.
    fn encode_record(&self, record: &Record) -> Option<bytes::Bytes> {
        let encoding = self.encoding();
        let encoded = {
            let encoder = self.shared.encoder.read().ok()?;
            encoder.encode(encoding, record)
        };
        match encoded {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                self.shared.diagnostics.emit_str(&error.to_string());
                None
            }
        }
    }

    async fn dispatch(&self, level: Level, payload: Payload, caller: Caller) {
        let record = Record::new(level, payload).with_caller(caller);
        if let Some(bytes) = self.encode_record(&record) {
            let _ = self.current_sink().write(bytes).await;
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging").finish_non_exhaustive()
    }
}

/// Logger bound to its own named file, sharing the context's level filter
/// and encoder settings.
pub struct FileLogger {
    context: Logging,
    sink: Arc<FileSink>,
}

impl FileLogger {
    /// Logs `message` at info level.
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        let caller = Caller::here();
        let message = message.into();
        async move {
            if !self.context.shared.filter.should_log(Level::Info) {
                return;
            }
            self.write(Level::Info, Payload::Text(message), caller).await;
        }
    }

    /// Logs `message` at error level, appending a captured backtrace.
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + '_ {
        let caller = Caller::here();
        let message = message.into();
        async move {
            if !self.context.shared.filter.should_log(Level::Error) {
                return;
            }
            self.write(Level::Error, Payload::Text(with_backtrace(message)), caller)
                .await;
        }
    }

    /// The file this logger writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.sink.path()
    }

    /// Closes the underlying sink, flushing queued entries.
    ///
    /// # Errors
    ///
    /// Returns the flush or close error from the sink.
    pub async fn close(&self) -> Result<()> {
        self.sink.close().await
    }

    async fn write(&self, level: Level, payload: Payload, caller: Caller) {
        let record = Record::new(level, payload).with_caller(caller);
        if let Some(bytes) = self.context.encode_record(&record) {
            let _ = self.sink.write(bytes).await;
        }
    }
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.sink.path())
            .finish_non_exhaustive()
    }
}

/// Applies the config fallbacks: empty path and separator revert to their
/// defaults.
fn normalize(mut config: LogConfig) -> LogConfig {
    if config.path.as_os_str().is_empty() {
        config.path = PathBuf::from(DEFAULT_LOG_PATH);
    }
    if config.plain_sep.is_empty() {
        config.plain_sep = DEFAULT_PLAIN_SEP.to_string();
    }
    config
}

fn with_backtrace(message: String) -> String {
    format!("{message}\n{}", Backtrace::force_capture())
}
