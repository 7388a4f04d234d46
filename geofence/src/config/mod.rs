//! INI configuration file.
//!
//! ```ini
//! [evaluator]
//! initial_outside = silent      ; or report_exit
//!
//! [logging]
//! level = info
//! file = /var/log/geofence.log  ; optional
//!
//! [fence.Home]
//! latitude = 37.0
//! longitude = -122.0
//! radius_m = 100
//! ```
//!
//! Fence sections are registered in file order, which is also the order in
//! which their transition events are reported for a single sample.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use crate::controller::{ControllerConfig, FenceController};
use crate::coord::Coordinate;
use crate::fence::{InitialOutsidePolicy, RegistryError};
use crate::logging::LoggingConfig;
use crate::source::PositionSource;

/// Section prefix that marks a fence definition.
pub const FENCE_SECTION_PREFIX: &str = "fence.";

/// Errors from loading or applying a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("Missing key '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Cannot register fence '{name}': {source}")]
    Fence {
        name: String,
        #[source]
        source: RegistryError,
    },
}

/// A fence as described in the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct FenceDefinition {
    pub name: String,
    pub center: Coordinate,
    pub radius_m: f64,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub initial_outside: InitialOutsidePolicy,
    pub logging: LoggingConfig,
    pub fences: Vec<FenceDefinition>,
}

impl ConfigFile {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_ini(&ini)
    }

    /// Parse configuration from a string.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = ConfigFile::default();

        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                continue;
            };

            match section {
                "evaluator" => {
                    if let Some(value) = properties.get("initial_outside") {
                        config.initial_outside = InitialOutsidePolicy::from_config_str(value)
                            .ok_or_else(|| ConfigError::InvalidValue {
                                section: section.to_string(),
                                key: "initial_outside".to_string(),
                                value: value.to_string(),
                                reason: "expected 'silent' or 'report_exit'".to_string(),
                            })?;
                    }
                }
                "logging" => {
                    if let Some(level) = properties.get("level") {
                        config.logging.level = level.trim().to_string();
                    }
                    if let Some(file) = properties.get("file") {
                        let file = file.trim();
                        if !file.is_empty() {
                            config.logging.file = Some(PathBuf::from(file));
                        }
                    }
                }
                _ => match section.strip_prefix(FENCE_SECTION_PREFIX) {
                    Some(name) => {
                        config.fences.push(parse_fence(section, name, properties)?);
                    }
                    None => warn!(section, "Ignoring unknown config section"),
                },
            }
        }

        Ok(config)
    }

    /// Controller settings derived from this file.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::default().with_initial_outside(self.initial_outside)
    }

    /// Register every configured fence with `controller`, in file order.
    ///
    /// Stops at the first fence the registry rejects.
    pub fn apply_fences<S: PositionSource>(
        &self,
        controller: &FenceController<S>,
    ) -> Result<usize, ConfigError> {
        for fence in &self.fences {
            controller
                .add_fence(&fence.name, fence.center, fence.radius_m)
                .map_err(|source| ConfigError::Fence {
                    name: fence.name.clone(),
                    source,
                })?;
        }
        Ok(self.fences.len())
    }
}

fn parse_fence(
    section: &str,
    name: &str,
    properties: &ini::Properties,
) -> Result<FenceDefinition, ConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: "name".to_string(),
            value: String::new(),
            reason: "fence name must not be empty".to_string(),
        });
    }

    let latitude = parse_f64(section, "latitude", properties)?;
    let longitude = parse_f64(section, "longitude", properties)?;
    let radius_m = parse_f64(section, "radius_m", properties)?;

    let center = Coordinate::new(latitude, longitude).map_err(|e| ConfigError::InvalidValue {
        section: section.to_string(),
        key: "latitude/longitude".to_string(),
        value: format!("{}, {}", latitude, longitude),
        reason: e.to_string(),
    })?;

    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: "radius_m".to_string(),
            value: radius_m.to_string(),
            reason: "radius must be greater than zero".to_string(),
        });
    }

    for (key, _) in properties.iter() {
        if !matches!(key, "latitude" | "longitude" | "radius_m") {
            warn!(section, key, "Ignoring unknown fence key");
        }
    }

    Ok(FenceDefinition {
        name: name.to_string(),
        center,
        radius_m,
    })
}

fn parse_f64(section: &str, key: &str, properties: &ini::Properties) -> Result<f64, ConfigError> {
    let raw = properties
        .get(key)
        .ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        })?;

    raw.trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use crate::controller::LoggingConsumer;
    use crate::source::ChannelSource;

    const SAMPLE: &str = r#"
[evaluator]
initial_outside = report_exit

[logging]
level = geofence=debug

[fence.Home]
latitude = 37.0
longitude = -122.0
radius_m = 100

[fence.Office]
latitude = 37.7749
longitude = -122.4194
radius_m = 250.5
"#;

    #[test]
    fn test_parse_full_config() {
        let config = ConfigFile::parse(SAMPLE).unwrap();

        assert_eq!(config.initial_outside, InitialOutsidePolicy::ReportExit);
        assert_eq!(config.logging.level, "geofence=debug");
        assert!(config.logging.file.is_none());

        let names: Vec<&str> = config.fences.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Office"]);
        assert_eq!(config.fences[1].radius_m, 250.5);
        assert_eq!(config.fences[0].center.latitude(), 37.0);
    }

    #[test]
    fn test_inline_comments_are_stripped() {
        let text = r#"
[evaluator]
initial_outside = silent      ; or report_exit

[logging]
level = info
file = /var/log/geofence.log  ; optional

[fence.Home]
latitude = 37.0
longitude = -122.0
radius_m = 100
"#;
        let config = ConfigFile::parse(text).unwrap();

        assert_eq!(config.initial_outside, InitialOutsidePolicy::Silent);
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/geofence.log"))
        );
        assert_eq!(config.fences.len(), 1);
        assert_eq!(config.fences[0].radius_m, 100.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.initial_outside, InitialOutsidePolicy::Silent);
    }

    #[test]
    fn test_missing_radius() {
        let err = ConfigFile::parse("[fence.Home]\nlatitude = 1\nlongitude = 2\n").unwrap_err();
        match err {
            ConfigError::MissingKey { section, key } => {
                assert_eq!(section, "fence.Home");
                assert_eq!(key, "radius_m");
            }
            other => panic!("Unexpected error: {}", other),
        }
    }

    #[test]
    fn test_negative_radius() {
        let err =
            ConfigFile::parse("[fence.Home]\nlatitude = 1\nlongitude = 2\nradius_m = -5\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "radius_m"));
    }

    #[test]
    fn test_out_of_range_center() {
        let err =
            ConfigFile::parse("[fence.Pole]\nlatitude = 91\nlongitude = 0\nradius_m = 5\n")
                .unwrap_err();
        assert!(err.to_string().contains("Invalid latitude"));
    }

    #[test]
    fn test_non_numeric_value() {
        let err =
            ConfigFile::parse("[fence.Home]\nlatitude = north\nlongitude = 0\nradius_m = 5\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "latitude"));
    }

    #[test]
    fn test_invalid_policy() {
        let err = ConfigFile::parse("[evaluator]\ninitial_outside = loud\n").unwrap_err();
        assert!(err.to_string().contains("initial_outside"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.fences.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigFile::load(Path::new("/nonexistent/geofence.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_apply_fences_in_order() {
        let config = ConfigFile::parse(SAMPLE).unwrap();
        let (source, _feeder) = ChannelSource::new();
        let controller = FenceController::with_config(
            source,
            Arc::new(LoggingConsumer),
            config.controller_config(),
        );

        assert_eq!(config.apply_fences(&controller).unwrap(), 2);
        let names: Vec<String> = controller
            .fences()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["Home", "Office"]);
    }

    #[test]
    fn test_apply_duplicate_fence_fails() {
        let config = ConfigFile::parse(SAMPLE).unwrap();
        let (source, _feeder) = ChannelSource::new();
        let controller = FenceController::new(source, Arc::new(LoggingConsumer));

        config.apply_fences(&controller).unwrap();
        let err = config.apply_fences(&controller).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Fence {
                source: RegistryError::DuplicateName(_),
                ..
            }
        ));
    }
}
