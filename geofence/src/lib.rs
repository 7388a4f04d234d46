//! GeoFence - circular geofence evaluation engine
//!
//! This library tracks a moving entity against a set of named circular
//! fences and reports exactly one enter/exit event per boundary crossing.
//!
//! # Modules
//!
//! - [`coord`] - validated coordinates and haversine distance
//! - [`fence`] - fence registry and transition evaluator
//! - [`source`] - position source boundary and bundled sources
//! - [`controller`] - wires a source to the evaluator and a consumer
//! - [`config`] - INI configuration file
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod controller;
pub mod coord;
pub mod fence;
pub mod logging;
pub mod source;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
