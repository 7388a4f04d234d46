//! Containment evaluation and per-fence transition state.
//!
//! # State Machine
//!
//! ```text
//! Unknown --[inside]--> Inside     emits Enter
//! Unknown --[outside]-> Outside    emits nothing (Silent) or Exit (ReportExit)
//! Inside  --[outside]-> Outside    emits Exit
//! Outside --[inside]--> Inside     emits Enter
//! X       --[X]-------> X          emits nothing
//! ```
//!
//! There is no hysteresis band. Boundary samples count as inside, so a
//! position sitting exactly on the radius stays classified the same way on
//! every evaluation. Jitter suppression belongs to the caller.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::registry::FenceRegistry;
use super::types::{ContainmentState, FenceId, TransitionEvent, TransitionKind};
use crate::source::PositionSample;

/// What to report when a fence's first sample lands outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialOutsidePolicy {
    /// Record the state without emitting an event.
    #[default]
    Silent,
    /// Emit an Exit event so the consumer learns the initial state.
    ReportExit,
}

impl InitialOutsidePolicy {
    /// Parse from a config string (`silent` or `report_exit`).
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Some(InitialOutsidePolicy::Silent),
            "report_exit" | "exit" => Some(InitialOutsidePolicy::ReportExit),
            _ => None,
        }
    }
}

impl std::fmt::Display for InitialOutsidePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitialOutsidePolicy::Silent => write!(f, "silent"),
            InitialOutsidePolicy::ReportExit => write!(f, "report_exit"),
        }
    }
}

/// Computes transition events and owns per-fence containment state.
///
/// The evaluator never copies fences; it reads them from the registry on
/// every call and keeps only derived state keyed by [`FenceId`].
#[derive(Debug, Default)]
pub struct FenceEvaluator {
    states: HashMap<FenceId, ContainmentState>,
    initial_outside: InitialOutsidePolicy,
}

impl FenceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(initial_outside: InitialOutsidePolicy) -> Self {
        Self {
            states: HashMap::new(),
            initial_outside,
        }
    }

    pub fn policy(&self) -> InitialOutsidePolicy {
        self.initial_outside
    }

    /// Evaluate one sample against every registered fence.
    ///
    /// Returns the transitions in registration order. State for fences that
    /// are no longer registered is discarded first, so it can never produce
    /// an event.
    pub fn evaluate(
        &mut self,
        sample: &PositionSample,
        registry: &FenceRegistry,
    ) -> Vec<TransitionEvent> {
        self.states
            .retain(|id, _| registry.get_by_id(*id).is_some());

        let mut events = Vec::new();

        for fence in registry.list() {
            let distance = fence.center().distance_to(&sample.coordinate);
            let current = if distance <= fence.radius_m() {
                ContainmentState::Inside
            } else {
                ContainmentState::Outside
            };

            let previous = self.states.insert(fence.id(), current).unwrap_or_default();

            trace!(
                fence = fence.name(),
                distance_m = distance,
                radius_m = fence.radius_m(),
                previous = %previous,
                current = %current,
                "Fence evaluated"
            );

            let Some(kind) = self.transition(previous, current) else {
                continue;
            };

            debug!(
                fence = fence.name(),
                kind = %kind,
                distance_m = distance,
                "Fence transition"
            );

            events.push(TransitionEvent {
                fence_id: fence.id(),
                fence_name: fence.name().to_string(),
                kind,
                coordinate: sample.coordinate,
                timestamp: sample.timestamp,
            });
        }

        events
    }

    /// The event (if any) for a `previous -> current` move.
    fn transition(
        &self,
        previous: ContainmentState,
        current: ContainmentState,
    ) -> Option<TransitionKind> {
        use ContainmentState::*;

        match (previous, current) {
            (Unknown, Inside) | (Outside, Inside) => Some(TransitionKind::Enter),
            (Inside, Outside) => Some(TransitionKind::Exit),
            (Unknown, Outside) => match self.initial_outside {
                InitialOutsidePolicy::Silent => None,
                InitialOutsidePolicy::ReportExit => Some(TransitionKind::Exit),
            },
            _ => None,
        }
    }

    /// Current containment for a fence (`Unknown` before its first sample).
    pub fn state(&self, id: FenceId) -> ContainmentState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Drop state for a fence that has been removed.
    pub fn forget(&mut self, id: FenceId) {
        self.states.remove(&id);
    }

    /// Number of fences with settled (non-Unknown) state.
    pub fn tracked(&self) -> usize {
        self.states.len()
    }
}
