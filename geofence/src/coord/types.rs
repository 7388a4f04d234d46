//! Coordinate value type and validation errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when constructing a [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90] or not a finite number.
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not a finite number.
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),
}

/// A WGS84 position in decimal degrees.
///
/// Construction through [`Coordinate::new`] guarantees both components are
/// finite and in range, so everything downstream (distance, containment)
/// can treat a `Coordinate` as valid without re-checking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters.
    ///
    /// See [`super::haversine_distance`].
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        super::haversine_distance(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Coordinate::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let coord = Coordinate::new(37.0, -122.0).unwrap();
        assert_eq!(coord.latitude(), 37.0);
        assert_eq!(coord.longitude(), -122.0);
    }

    #[test]
    fn test_range_edges_are_valid() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordError::InvalidLatitude(90.5))
        );
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_invalid_longitude() {
        assert_eq!(
            Coordinate::new(0.0, -180.1),
            Err(CoordError::InvalidLongitude(-180.1))
        );
        assert!(matches!(
            Coordinate::new(0.0, f64::INFINITY),
            Err(CoordError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_try_from_tuple() {
        let coord: Coordinate = (51.5, -0.1).try_into().unwrap();
        assert_eq!(coord.latitude(), 51.5);
    }

    #[test]
    fn test_display() {
        let coord = Coordinate::new(37.0, -122.0).unwrap();
        assert_eq!(format!("{}", coord), "(37.000000, -122.000000)");
    }

    #[test]
    fn test_error_display() {
        let err = CoordError::InvalidLatitude(91.0);
        assert!(err.to_string().contains("Invalid latitude"));
    }
}
