//! Geographic coordinates and great-circle distance.
//!
//! Provides the validated [`Coordinate`] value type and the haversine
//! distance used for every containment test in the crate.
//!
//! # Earth Model
//!
//! Distances assume a sphere with the mean Earth radius (6 371 000 m).
//! The error against the WGS84 ellipsoid is below 0.5%, which is well inside
//! the accuracy of consumer position fixes.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (haversine).
///
/// ```text
/// a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
/// c = 2 · atan2(√a, √(1−a))
/// d = R · c
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.latitude().to_radians();
    let phi2 = to.latitude().to_radians();
    let d_phi = (to.latitude() - from.latitude()).to_radians();
    let d_lambda = (to.longitude() - from.longitude()).to_radians();

    let sin_d_phi = (d_phi / 2.0).sin();
    let sin_d_lambda = (d_lambda / 2.0).sin();

    let a = sin_d_phi * sin_d_phi + phi1.cos() * phi2.cos() * sin_d_lambda * sin_d_lambda;
    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
