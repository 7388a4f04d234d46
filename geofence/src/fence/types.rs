//! Core fence data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::coord::Coordinate;

/// Opaque fence identifier assigned by the [`FenceRegistry`](super::FenceRegistry).
///
/// Identifiers increase monotonically and are never reused by a registry, so
/// per-fence state keyed by `FenceId` cannot leak from a removed fence into a
/// later fence that happens to reuse its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FenceId(pub(crate) u64);

impl FenceId {
    /// Raw numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named circular region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fence {
    id: FenceId,
    name: String,
    center: Coordinate,
    radius_m: f64,
}

impl Fence {
    /// Only the registry creates fences; it has already validated the inputs.
    pub(crate) fn new(id: FenceId, name: String, center: Coordinate, radius_m: f64) -> Self {
        Self {
            id,
            name,
            center,
            radius_m,
        }
    }

    pub fn id(&self) -> FenceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Radius in meters (always > 0).
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Whether `point` lies within the fence.
    ///
    /// The boundary is inclusive: a point exactly `radius_m` away is inside.
    #[inline]
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.distance_to(point) <= self.radius_m
    }

    /// Containment classification for `point`.
    #[inline]
    pub fn classify(&self, point: &Coordinate) -> ContainmentState {
        if self.contains(point) {
            ContainmentState::Inside
        } else {
            ContainmentState::Outside
        }
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} r={}m", self.name, self.center, self.radius_m)
    }
}

/// Last known relationship between the tracked entity and a fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentState {
    /// No sample has been evaluated against this fence yet.
    #[default]
    Unknown,
    Inside,
    Outside,
}

impl fmt::Display for ContainmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainmentState::Unknown => write!(f, "unknown"),
            ContainmentState::Inside => write!(f, "inside"),
            ContainmentState::Outside => write!(f, "outside"),
        }
    }
}

/// Direction of a boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Enter,
    Exit,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Enter => write!(f, "enter"),
            TransitionKind::Exit => write!(f, "exit"),
        }
    }
}

/// A single enter/exit notification for one fence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionEvent {
    pub fence_id: FenceId,
    pub fence_name: String,
    pub kind: TransitionKind,
    /// The sample that caused the transition.
    pub coordinate: Coordinate,
    /// Timestamp of that sample.
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} ({})",
            self.kind,
            self.fence_name,
            self.coordinate,
            self.timestamp.to_rfc3339()
        )
    }
}
