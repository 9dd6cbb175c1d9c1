//! # Logger
//!
//! Console and file logging for the web server. The console writes to stderr, compact and
//! coloured for terminals or as JSON lines for container log collectors. Files are rolling JSON
//! logs written through a non-blocking worker. `RUST_LOG` applies when no filter directives are
//! configured.
//!
//! ## Example
//!
//! ```rust
//! # use imt_logger::{ConsoleFormat, LevelFilter, Logger};
//! let _logger = Logger::builder("www-immanent-tech")
//!     .level(LevelFilter::DEBUG)
//!     .console(ConsoleFormat::Compact)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

/// How events are printed on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug)]
struct FileOutput {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
}

/// Collects the logging options before the global subscriber is installed.
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    directives: Option<String>,
    console: ConsoleFormat,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    /// Default level for targets without a directive.
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// `EnvFilter` directives such as `tower_http=debug,imt_kernel=trace`. Replaces `RUST_LOG`.
    #[must_use]
    pub fn directives(mut self, directives: Option<impl Into<String>>) -> Self {
        self.directives = directives.map(Into::into).filter(|d: &String| !d.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn console(mut self, format: ConsoleFormat) -> Self {
        self.console = format;
        self
    }

    /// Also writes JSON lines to `<directory>/<name>.<date>.log`, keeping at most `max_files`.
    #[must_use]
    pub fn file(mut self, directory: impl Into<PathBuf>, rotation: Rotation, max_files: usize) -> Self {
        self.file = Some(FileOutput { directory: directory.into(), rotation, max_files });
        self
    }

    fn validate(&self) -> Result<(), LoggerError> {
        let invalid = |message: &'static str| {
            Err(LoggerError::InvalidConfiguration { message: message.into(), context: None })
        };

        if self.name.trim().is_empty() {
            return invalid("Logger name cannot be empty");
        }
        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return invalid("max_files must be greater than zero");
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid filter '{directives}': {e}").into(),
                context: None,
            }),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it flushes and stops the file
    /// writer.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files` or malformed
    /// directives, [`LoggerError::Internal`] if the log directory cannot be created,
    /// [`LoggerError::Appender`] if the rolling file cannot be opened and
    /// [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let env_filter = self.env_filter()?;

        let console = layer().with_writer(std::io::stderr);
        let mut layers = vec![match self.console {
            ConsoleFormat::Compact => console.compact().with_ansi(true).boxed(),
            ConsoleFormat::Json => console.json().with_ansi(false).boxed(),
        }];

        let mut directory = None;
        let guard = match self.file {
            Some(file) => {
                fs::create_dir_all(&file.directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Failed to create {}", file.directory.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(file.rotation)
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(file.max_files)
                    .build(&file.directory)
                    .context(format!("Failed to open log files in {}", file.directory.display()))?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                layers.push(layer().with_writer(writer).with_ansi(false).json().boxed());
                directory = Some(file.directory);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layers)
            .try_init()
            .context("Global subscriber")?;

        Ok(Logger { directory, _guard: guard })
    }
}

/// Handle to the installed subscriber.
#[must_use = "Dropping this handle stops the log file writer."]
#[derive(Debug)]
pub struct Logger {
    directory: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// `name` prefixes rolling log files (e.g. `www-immanent-tech.2025-10-27.log`).
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            directives: None,
            console: ConsoleFormat::default(),
            file: None,
        }
    }

    /// Directory of the log files, `None` when logging to the console only.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_compact_console_at_info() {
        let builder = Logger::builder("test-app");
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.console, ConsoleFormat::Compact);
        assert!(builder.directives.is_none());
        assert!(builder.file.is_none());
    }

    #[test]
    fn blank_directives_fall_back_to_environment() {
        let builder = Logger::builder("test-app").directives(Some("  "));
        assert!(builder.directives.is_none());

        let builder = Logger::builder("test-app").directives(Some("imt_site=debug"));
        assert_eq!(builder.directives.as_deref(), Some("imt_site=debug"));
    }

    #[test]
    fn malformed_directives_are_rejected() {
        let builder = Logger::builder("test-app").directives(Some("imt_kernel=loud"));
        assert!(matches!(builder.env_filter(), Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn zero_max_files_and_blank_name_are_rejected() {
        let no_files = Logger::builder("test-app").file("logs", Rotation::DAILY, 0);
        assert!(no_files.validate().is_err());
        assert!(Logger::builder(" ").validate().is_err());
        assert!(Logger::builder("test-app").file("logs", Rotation::HOURLY, 3).validate().is_ok());
    }
}
