//! CLI error type.

use geofence::config::ConfigError;
use geofence::controller::ControllerError;
use geofence::coord::CoordError;
use geofence::logging::LoggingError;
use thiserror::Error;

use crate::track::TrackError;

/// Errors surfaced to the user by the `geofence` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Invalid coordinate: {0}")]
    Coordinate(#[from] CoordError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Failed to set signal handler: {0}")]
    Signal(String),

    #[error("Source fault ended the replay: {0}")]
    SourceFault(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SourceFault(_) => 3,
            CliError::Config(_) | CliError::Track(_) | CliError::Coordinate(_) => 2,
            _ => 1,
        }
    }
}
