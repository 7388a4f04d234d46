//! Position source boundary.
//!
//! A [`PositionSource`] is anything that produces position fixes and
//! availability faults: a platform location service, a GPS daemon, a
//! recorded track. The core never talks to hardware itself; it hands the
//! source a [`SourceSink`] on start and consumes whatever arrives on the
//! other end.
//!
//! # Architecture
//!
//! ```text
//! PositionSource ──► SourceSink ──► (unbounded channel) ──► FenceController
//!                    sample / fault / status                 intake task
//! ```
//!
//! Two sources ship with the crate:
//!
//! - [`ChannelSource`] - fed by a [`SourceFeeder`] handle from host code
//! - [`ReplaySource`] - replays a recorded track at a fixed interval

mod channel;
mod fault;
mod replay;
mod sample;

pub use channel::{ChannelSource, SourceFeeder};
pub use fault::{AuthorizationStatus, FaultKind, SourceFault};
pub use replay::{ReplayConfig, ReplaySource, DEFAULT_REPLAY_INTERVAL, REPLAY_FINISHED_STATUS};
pub use sample::PositionSample;

use tokio::sync::mpsc;

/// Anything a position source can report.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A new position fix.
    Sample(PositionSample),
    /// The source hit a problem.
    Fault(SourceFault),
    /// Best-effort human-readable status text.
    Status(String),
}

/// Sending half handed to a source on start.
///
/// Cheap to clone. Sends never block; they fail only once the controller has
/// stopped listening.
#[derive(Debug, Clone)]
pub struct SourceSink {
    tx: mpsc::UnboundedSender<SourceEvent>,
}

impl SourceSink {
    /// Create a sink and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SourceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send any event. Returns `false` if the receiver is gone.
    pub fn send(&self, event: SourceEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn sample(&self, sample: PositionSample) -> bool {
        self.send(SourceEvent::Sample(sample))
    }

    pub fn fault(&self, fault: SourceFault) -> bool {
        self.send(SourceEvent::Fault(fault))
    }

    pub fn status(&self, text: impl Into<String>) -> bool {
        self.send(SourceEvent::Status(text.into()))
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A producer of position samples and faults.
///
/// `start` may be called again after `stop`; each call receives a fresh sink.
/// Denied authorization or an unavailable service must be reported as a
/// [`SourceFault`] through the sink; the core forwards it and never retries.
pub trait PositionSource: Send + 'static {
    /// Begin producing events into `sink`.
    fn start(&mut self, sink: SourceSink);

    /// Stop producing events. Must not block.
    fn stop(&mut self);

    /// Current authorization for position access.
    fn authorization(&self) -> AuthorizationStatus {
        AuthorizationStatus::NotDetermined
    }

    /// Short name used in logs.
    fn name(&self) -> &str {
        "position source"
    }
}

impl<S: PositionSource + ?Sized> PositionSource for Box<S> {
    fn start(&mut self, sink: SourceSink) {
        (**self).start(sink)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn authorization(&self) -> AuthorizationStatus {
        (**self).authorization()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
