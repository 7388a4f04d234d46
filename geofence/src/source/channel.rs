//! Host-fed position source.
//!
//! [`ChannelSource`] is the adapter for platform location services: the host
//! keeps the [`SourceFeeder`] and pushes fixes and faults into it from
//! whatever callback its location API uses. Pushes made while the controller
//! is stopped are dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::{AuthorizationStatus, PositionSample, PositionSource, SourceFault, SourceSink};
use crate::coord::{CoordError, Coordinate};

#[derive(Debug, Default)]
struct Shared {
    sink: Option<SourceSink>,
    authorization: AuthorizationStatus,
}

/// Position source whose events are pushed by a [`SourceFeeder`].
#[derive(Debug)]
pub struct ChannelSource {
    shared: Arc<Mutex<Shared>>,
}

/// Handle used by host code to feed a [`ChannelSource`].
///
/// Lightweight and cheap to clone.
#[derive(Debug, Clone)]
pub struct SourceFeeder {
    shared: Arc<Mutex<Shared>>,
}

impl ChannelSource {
    /// Create a source and the feeder that drives it.
    pub fn new() -> (Self, SourceFeeder) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            SourceFeeder { shared },
        )
    }
}

impl PositionSource for ChannelSource {
    fn start(&mut self, sink: SourceSink) {
        self.shared.lock().sink = Some(sink);
    }

    fn stop(&mut self) {
        self.shared.lock().sink = None;
    }

    fn authorization(&self) -> AuthorizationStatus {
        self.shared.lock().authorization
    }

    fn name(&self) -> &str {
        "channel"
    }
}

impl SourceFeeder {
    /// Push a sample. Returns `false` if the source is not started.
    pub fn push_sample(&self, sample: PositionSample) -> bool {
        self.with_sink(|sink| sink.sample(sample))
    }

    /// Validate and push a position stamped with the current time.
    ///
    /// Invalid coordinates never reach the controller.
    pub fn push_position(&self, latitude: f64, longitude: f64) -> Result<bool, CoordError> {
        let coordinate = Coordinate::new(latitude, longitude)?;
        Ok(self.push_sample(PositionSample::new(coordinate)))
    }

    /// Push a fault. Returns `false` if the source is not started.
    pub fn push_fault(&self, fault: SourceFault) -> bool {
        self.with_sink(|sink| sink.fault(fault))
    }

    /// Push a status message. Returns `false` if the source is not started.
    pub fn push_status(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.with_sink(|sink| sink.status(text))
    }

    /// Record a change in position access authorization.
    ///
    /// A transition to `Denied` is also pushed as an
    /// [`AuthorizationDenied`](super::FaultKind::AuthorizationDenied) fault.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        let previous = {
            let mut shared = self.shared.lock();
            std::mem::replace(&mut shared.authorization, status)
        };

        if status == AuthorizationStatus::Denied && previous != AuthorizationStatus::Denied {
            self.push_fault(SourceFault::authorization_denied(
                "Position access was denied",
            ));
        }
    }

    /// Whether the source is currently attached to a running controller.
    pub fn is_active(&self) -> bool {
        self.shared
            .lock()
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.is_closed())
    }

    fn with_sink(&self, f: impl FnOnce(&SourceSink) -> bool) -> bool {
        // Clone out of the lock so a slow receiver never holds it.
        let sink = self.shared.lock().sink.clone();
        match sink {
            Some(sink) => f(&sink),
            None => {
                trace!("Dropping push to stopped channel source");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FaultKind, SourceEvent};

    #[test]
    fn test_push_before_start_is_dropped() {
        let (_source, feeder) = ChannelSource::new();
        assert!(!feeder.push_position(1.0, 1.0).unwrap());
        assert!(!feeder.is_active());
    }

    #[test]
    fn test_push_after_start_is_delivered() {
        let (mut source, feeder) = ChannelSource::new();
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        assert!(feeder.is_active());
        assert!(feeder.push_position(37.0, -122.0).unwrap());
        assert!(matches!(rx.try_recv().unwrap(), SourceEvent::Sample(_)));
    }

    #[test]
    fn test_push_after_stop_is_dropped() {
        let (mut source, feeder) = ChannelSource::new();
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);
        source.stop();

        assert!(!feeder.push_status("hello"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_invalid_position_rejected() {
        let (mut source, feeder) = ChannelSource::new();
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        assert!(feeder.push_position(0.0, 200.0).is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_denied_authorization_pushes_one_fault() {
        let (mut source, feeder) = ChannelSource::new();
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        feeder.set_authorization(AuthorizationStatus::Denied);
        feeder.set_authorization(AuthorizationStatus::Denied);

        assert_eq!(source.authorization(), AuthorizationStatus::Denied);
        match rx.try_recv().unwrap() {
            SourceEvent::Fault(fault) => assert_eq!(fault.kind, FaultKind::AuthorizationDenied),
            other => panic!("Expected fault, got {:?}", other),
        }
        assert!(rx.try_recv().is_err(), "Fault must not be duplicated");
    }
}
