//! Timestamped position samples.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coord::{CoordError, Coordinate};

/// A single position fix from a position source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    /// Where the entity was.
    pub coordinate: Coordinate,
    /// When the fix was taken.
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    /// Create a sample stamped with the current time.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            timestamp: Utc::now(),
        }
    }

    /// Create a sample with an explicit timestamp.
    pub fn with_timestamp(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            timestamp,
        }
    }

    /// Validate raw degrees and stamp with the current time.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        Ok(Self::new(Coordinate::new(latitude, longitude)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_with_timestamp() {
        let ts = Utc.with_ymd_and_hms(2016, 4, 28, 12, 0, 0).unwrap();
        let sample = PositionSample::with_timestamp(Coordinate::new(1.0, 2.0).unwrap(), ts);
        assert_eq!(sample.timestamp, ts);
        assert_eq!(sample.coordinate.longitude(), 2.0);
    }

    #[test]
    fn test_from_degrees_validates() {
        assert!(PositionSample::from_degrees(45.0, 90.0).is_ok());
        assert!(matches!(
            PositionSample::from_degrees(-91.0, 0.0),
            Err(CoordError::InvalidLatitude(_))
        ));
    }
}
