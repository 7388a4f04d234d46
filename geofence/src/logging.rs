//! Tracing subscriber setup.
//!
//! Installs a `tracing_subscriber` fmt layer on stderr and, optionally, a
//! non-blocking file layer from `tracing-appender`. `RUST_LOG` takes
//! precedence over the configured level.
//!
//! # Example
//!
//! ```ignore
//! let _guard = geofence::logging::init_logging(&LoggingConfig::default())?;
//! tracing::info!("ready");
//! // Keep `_guard` alive until shutdown so buffered file output is flushed.
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `geofence=debug`.
    pub level: String,
    /// Optional log file; written in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Cannot open log file {path}: {reason}")]
    File { path: PathBuf, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the file writer alive. Drop it only at shutdown.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the level filter, letting `RUST_LOG` override `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|source| LoggingError::InvalidFilter {
        directive: level.to_string(),
        source,
    })
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level)?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match &config.file {
        Some(path) => {
            let appender = file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

            Ok(LoggingGuard { _file: Some(guard) })
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

            Ok(LoggingGuard { _file: None })
        }
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::File {
            path: path.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| LoggingError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::default()
            .with_level("geofence=debug")
            .with_file("/tmp/geofence.log");
        assert_eq!(config.level, "geofence=debug");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/geofence.log")));
    }

    #[test]
    fn test_file_appender_requires_file_name() {
        let err = file_appender(Path::new("/")).err().unwrap();
        assert!(matches!(err, LoggingError::File { .. }));
    }

    #[test]
    fn test_file_appender_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fences.log");
        assert!(file_appender(&path).is_ok());
        assert!(path.exists());
    }
}
