//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: console output in one of
//! three formats, an optional rolling file sink written through a non-blocking
//! worker, and an `EnvFilter` seeded from the builder and overridable with
//! `RUST_LOG`.
//!
//! ```rust
//! use scaffold_logger::{LevelFilter, LogFormat, Logger};
//!
//! let _logger = Logger::builder("my-app")
//!     .format(LogFormat::Pretty)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt::layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LoggerError::InvalidConfiguration {
                message: format!("Unknown log format '{other}', expected compact, pretty or json")
                    .into(),
                context: None,
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

/// Rolling file output settings.
#[derive(Debug, Clone)]
struct FileSink {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

/// Configures and installs the global subscriber.
#[derive(Debug)]
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    directives: Option<String>,
    console: Option<LogFormat>,
    file: Option<FileSink>,
}

impl LoggerBuilder {
    /// Minimum level emitted when no directive overrides it.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Programmatic filter directives, e.g. `scaffold=debug,hyper=info`.
    ///
    /// `RUST_LOG` is ignored once explicit directives are given. Invalid
    /// directives make [`LoggerBuilder::init`] fail.
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Console output format.
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.console = Some(format);
        self
    }

    /// Turns console output off, e.g. when only a file sink is wanted.
    pub const fn without_console(mut self) -> Self {
        self.console = None;
        self
    }

    /// Writes logs to `{directory}/{name}.{date}.log` in addition to the console.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.file = Some(FileSink {
            directory: directory.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        self
    }

    /// File rotation; ignored without [`LoggerBuilder::directory`].
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files kept; ignored without [`LoggerBuilder::directory`].
    pub fn max_files(mut self, max_files: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max_files;
        }
        self
    }

    /// Writes JSON lines to the file sink; ignored without [`LoggerBuilder::directory`].
    pub fn json_file(mut self) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.json = true;
        }
        self
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the whole process: dropping it
    /// stops the background file writer.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero retained
    ///   files, invalid directives, or no output at all.
    /// * [`LoggerError::Appender`] when the file appender cannot be created.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let filter = self.env_filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::new();

        if let Some(format) = self.console {
            layers.push(match format {
                LogFormat::Compact => layer().compact().boxed(),
                LogFormat::Pretty => layer().pretty().boxed(),
                LogFormat::Json => layer().json().with_ansi(false).boxed(),
            });
        }

        let guard = match &self.file {
            Some(sink) => {
                let (file_layer, guard) = file_layer(&self.name, sink)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled; enable console or file output".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        tracing::debug!(
            name = %self.name,
            console = ?self.console,
            file = self.file.is_some(),
            "Logger initialized"
        );
        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => builder.parse(directives).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("Invalid filter directives '{directives}': {e}").into(),
                    context: None,
                }
            }),
        }
    }
}

fn file_layer(name: &str, sink: &FileSink) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&sink.directory).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(
            format!("Failed to create log directory {}", sink.directory.display()).into(),
        ),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(sink.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(sink.max_files)
        .build(&sink.directory)
        .context("Failed to build rolling file appender")?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let base = layer().with_writer(writer).with_ansi(false);
    let boxed = if sink.json { base.json().boxed() } else { base.boxed() };

    Ok((boxed, guard))
}

/// Handle to the installed subscriber.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` prefixes rolled log files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            directives: None,
            console: Some(LogFormat::default()),
            file: None,
        }
    }

    /// `true` when a file sink is active.
    #[must_use]
    pub const fn has_file_sink(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
