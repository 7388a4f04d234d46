//! Recorded-track position source.
//!
//! Replays a fixed list of coordinates on the Tokio runtime, one sample per
//! interval. Stopping and starting again resumes from the next unsent sample.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{AuthorizationStatus, PositionSample, PositionSource, SourceFault, SourceSink};
use crate::coord::Coordinate;

/// Default delay between replayed samples.
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_millis(100);

/// Status text sent after the last sample of the track.
pub const REPLAY_FINISHED_STATUS: &str = "Replay finished";

/// Configuration for [`ReplaySource`].
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Delay before each sample. Zero replays as fast as possible.
    pub interval: Duration,
    /// Authorization the source reports; `Denied` makes `start` emit a fault
    /// instead of samples.
    pub authorization: AuthorizationStatus,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REPLAY_INTERVAL,
            authorization: AuthorizationStatus::Granted,
        }
    }
}

impl ReplayConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_authorization(mut self, authorization: AuthorizationStatus) -> Self {
        self.authorization = authorization;
        self
    }
}

/// Position source that replays a recorded track.
#[derive(Debug)]
pub struct ReplaySource {
    track: Arc<Vec<Coordinate>>,
    config: ReplayConfig,
    /// Index of the next sample to send; survives stop/start.
    cursor: Arc<AtomicUsize>,
    shutdown: Option<CancellationToken>,
}

impl ReplaySource {
    pub fn new(track: Vec<Coordinate>) -> Self {
        Self::with_config(track, ReplayConfig::default())
    }

    pub fn with_config(track: Vec<Coordinate>, config: ReplayConfig) -> Self {
        Self {
            track: Arc::new(track),
            config,
            cursor: Arc::new(AtomicUsize::new(0)),
            shutdown: None,
        }
    }

    /// Total samples in the track.
    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }

    /// Samples not yet sent.
    pub fn remaining(&self) -> usize {
        self.track
            .len()
            .saturating_sub(self.cursor.load(Ordering::Acquire))
    }

    async fn run(
        track: Arc<Vec<Coordinate>>,
        cursor: Arc<AtomicUsize>,
        interval: Duration,
        sink: SourceSink,
        shutdown: CancellationToken,
    ) {
        loop {
            let index = cursor.load(Ordering::Acquire);
            let Some(coordinate) = track.get(index).copied() else {
                info!(samples = track.len(), "Replay finished");
                sink.status(REPLAY_FINISHED_STATUS);
                break;
            };

            if !interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            } else if shutdown.is_cancelled() {
                break;
            }

            if !sink.sample(PositionSample::new(coordinate)) {
                debug!("Replay receiver closed");
                break;
            }
            cursor.store(index + 1, Ordering::Release);
        }
    }
}

impl PositionSource for ReplaySource {
    fn start(&mut self, sink: SourceSink) {
        self.stop();

        if self.config.authorization == AuthorizationStatus::Denied {
            sink.fault(SourceFault::authorization_denied(
                "Replay source is configured without position access",
            ));
            return;
        }
        if self.track.is_empty() {
            sink.fault(SourceFault::unavailable("Track contains no samples"));
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            sink.fault(SourceFault::unavailable(
                "Replay source requires a Tokio runtime",
            ));
            return;
        };

        sink.status(format!("Replaying {} samples", self.remaining()));

        let shutdown = CancellationToken::new();
        handle.spawn(Self::run(
            Arc::clone(&self.track),
            Arc::clone(&self.cursor),
            self.config.interval,
            sink,
            shutdown.clone(),
        ));
        self.shutdown = Some(shutdown);
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.cancel();
        }
    }

    fn authorization(&self) -> AuthorizationStatus {
        self.config.authorization
    }

    fn name(&self) -> &str {
        "replay"
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FaultKind, SourceEvent};

    fn track() -> Vec<Coordinate> {
        vec![
            Coordinate::new(37.0, -122.0).unwrap(),
            Coordinate::new(37.01, -122.0).unwrap(),
            Coordinate::new(37.0, -122.0).unwrap(),
        ]
    }

    fn fast() -> ReplayConfig {
        ReplayConfig::default().with_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_replays_all_samples_then_finishes() {
        let mut source = ReplaySource::with_config(track(), fast());
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        assert!(matches!(rx.recv().await, Some(SourceEvent::Status(_))));
        for expected in track() {
            match rx.recv().await {
                Some(SourceEvent::Sample(s)) => assert_eq!(s.coordinate, expected),
                other => panic!("Expected sample, got {:?}", other),
            }
        }
        assert_eq!(
            rx.recv().await,
            Some(SourceEvent::Status(REPLAY_FINISHED_STATUS.to_string()))
        );
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_denied_authorization_emits_fault_only() {
        let config = fast().with_authorization(AuthorizationStatus::Denied);
        let mut source = ReplaySource::with_config(track(), config);
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        match rx.recv().await {
            Some(SourceEvent::Fault(f)) => assert_eq!(f.kind, FaultKind::AuthorizationDenied),
            other => panic!("Expected fault, got {:?}", other),
        }
        // The sink was consumed by `start`, so the channel closes.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_empty_track_is_unavailable() {
        let mut source = ReplaySource::with_config(Vec::new(), fast());
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        match rx.recv().await {
            Some(SourceEvent::Fault(f)) => assert_eq!(f.kind, FaultKind::Unavailable),
            other => panic!("Expected fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_halts_replay() {
        let config = ReplayConfig::default().with_interval(Duration::from_secs(60));
        let mut source = ReplaySource::with_config(track(), config);
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);
        source.stop();

        assert!(matches!(rx.recv().await, Some(SourceEvent::Status(_))));
        // Task exits without sending and drops the sink.
        assert_eq!(rx.recv().await, None);
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn test_start_without_runtime_reports_unavailable() {
        let mut source = ReplaySource::with_config(track(), fast());
        let (sink, mut rx) = SourceSink::channel();
        source.start(sink);

        match rx.try_recv().unwrap() {
            SourceEvent::Fault(f) => assert_eq!(f.kind, FaultKind::Unavailable),
            other => panic!("Expected fault, got {:?}", other),
        }
    }
}
