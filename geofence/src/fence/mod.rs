//! Fence registry and evaluation engine.
//!
//! The [`FenceRegistry`] owns the fences; the [`FenceEvaluator`] reads them
//! for each position sample and turns containment changes into
//! [`TransitionEvent`]s.
//!
//! # Example
//!
//! ```
//! use geofence::coord::Coordinate;
//! use geofence::fence::{FenceEvaluator, FenceRegistry, TransitionKind};
//! use geofence::source::PositionSample;
//!
//! let mut registry = FenceRegistry::new();
//! registry.add("Home", Coordinate::new(37.0, -122.0)?, 100.0)?;
//!
//! let mut evaluator = FenceEvaluator::new();
//! let sample = PositionSample::new(Coordinate::new(37.0, -122.0)?);
//! let events = evaluator.evaluate(&sample, &registry);
//!
//! assert_eq!(events[0].kind, TransitionKind::Enter);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod evaluator;
mod registry;
mod types;

pub use evaluator::{FenceEvaluator, InitialOutsidePolicy};
pub use registry::{FenceRegistry, RegistryError};
pub use types::{ContainmentState, Fence, FenceId, TransitionEvent, TransitionKind};
