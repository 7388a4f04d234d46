//! Controller counters.
//!
//! Lock-free counters updated on the intake path, copied out as a
//! [`ControllerStats`] snapshot for display.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters owned by the controller.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    samples: AtomicU64,
    enters: AtomicU64,
    exits: AtomicU64,
    faults: AtomicU64,
    dropped: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn sample_processed(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn enter_emitted(&self) {
        self.enters.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn exit_emitted(&self) {
        self.exits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fault_forwarded(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn events_dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ControllerStats {
        ControllerStats {
            samples_processed: self.samples.load(Ordering::Relaxed),
            enter_events: self.enters.load(Ordering::Relaxed),
            exit_events: self.exits.load(Ordering::Relaxed),
            faults_forwarded: self.faults.load(Ordering::Relaxed),
            events_dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the controller counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControllerStats {
    /// Samples evaluated against the fence set.
    pub samples_processed: u64,
    pub enter_events: u64,
    pub exit_events: u64,
    /// Faults delivered to the consumer.
    pub faults_forwarded: u64,
    /// Source events discarded because the controller was stopping.
    pub events_dropped: u64,
}

impl ControllerStats {
    pub fn transitions(&self) -> u64 {
        self.enter_events + self.exit_events
    }
}

impl fmt::Display for ControllerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples, {} enters, {} exits, {} faults, {} dropped",
            self.samples_processed,
            self.enter_events,
            self.exit_events,
            self.faults_forwarded,
            self.events_dropped
        )
    }
}
