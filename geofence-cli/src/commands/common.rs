//! Common utilities shared across CLI commands.

use geofence::logging::{init_logging, LoggingConfig, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Log level used when `--verbose` is given.
const VERBOSE_LOG_LEVEL: &str = "debug";

/// Resolve the effective logging settings: `--verbose` wins over the config.
pub fn resolve_logging(config: &LoggingConfig, verbose: bool) -> LoggingConfig {
    if verbose {
        config.clone().with_level(VERBOSE_LOG_LEVEL)
    } else {
        config.clone()
    }
}

/// Install the tracing subscriber and log the startup banner.
///
/// The returned guard must be held until the command finishes so buffered
/// file output is flushed.
pub fn start_logging(
    config: &LoggingConfig,
    verbose: bool,
    command: &str,
) -> Result<LoggingGuard, CliError> {
    let guard = init_logging(&resolve_logging(config, verbose))?;
    info!(version = geofence::VERSION, command, "geofence starting");
    Ok(guard)
}
