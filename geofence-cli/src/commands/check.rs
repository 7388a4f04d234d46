//! Check command - validate a configuration file and list its fences.

use std::path::PathBuf;

use geofence::config::{ConfigError, ConfigFile};
use geofence::fence::FenceRegistry;

use super::common::start_logging;
use crate::error::CliError;

/// Arguments for the check command.
pub struct CheckArgs {
    pub config: PathBuf,
    pub verbose: bool,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let config = ConfigFile::load(&args.config)?;
    let _guard = start_logging(&config.logging, args.verbose, "check")?;

    let registry = build_registry(&config)?;

    println!("Configuration: {}", args.config.display());
    println!("  Initial outside: {}", config.initial_outside);
    println!("  Log level:       {}", config.logging.level);
    if let Some(ref file) = config.logging.file {
        println!("  Log file:        {}", file.display());
    }
    println!();

    if registry.is_empty() {
        println!("No fences defined.");
        return Ok(());
    }

    println!("Fences ({}):", registry.len());
    for fence in registry.list() {
        println!(
            "  {:<6} {:<20} {}  radius {:.1} m",
            fence.id().to_string(),
            fence.name(),
            fence.center(),
            fence.radius_m()
        );
    }

    Ok(())
}

/// Register every configured fence in a scratch registry so duplicate names
/// are caught the same way the controller would catch them.
fn build_registry(config: &ConfigFile) -> Result<FenceRegistry, ConfigError> {
    let mut registry = FenceRegistry::new();
    for fence in &config.fences {
        registry
            .add(&fence.name, fence.center, fence.radius_m)
            .map_err(|source| ConfigError::Fence {
                name: fence.name.clone(),
                source,
            })?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_keeps_file_order() {
        let config = ConfigFile::parse(
            "[fence.B]\nlatitude = 1\nlongitude = 1\nradius_m = 10\n\
             [fence.A]\nlatitude = 2\nlongitude = 2\nradius_m = 20\n",
        )
        .unwrap();

        let registry = build_registry(&config).unwrap();
        let names: Vec<&str> = registry.list().map(|f| f.name()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
