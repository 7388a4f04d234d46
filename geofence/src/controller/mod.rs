//! Fence controller: wires a position source to the evaluator and consumer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       FenceController                        │
//! │                                                              │
//! │  PositionSource ──► SourceSink ──► intake task               │
//! │                                        │                     │
//! │                                        ▼ (intake lock)       │
//! │                    ┌─────────────────────────────────┐       │
//! │                    │ state lock                      │       │
//! │   add / remove ───►│  FenceRegistry + FenceEvaluator │       │
//! │                    └────────────────┬────────────────┘       │
//! │                                     ▼                        │
//! │                           FenceConsumer callbacks            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The intake lock serializes event processing so samples are evaluated and
//! delivered strictly in arrival order. The state lock covers registry and
//! evaluator together, which makes an evaluation atomic with respect to
//! `add_fence`/`remove_fence`. Consumer callbacks run after the state lock
//! is released.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use geofence::controller::{FenceController, LoggingConsumer};
//! use geofence::source::ChannelSource;
//!
//! let (source, feeder) = ChannelSource::new();
//! let mut controller = FenceController::new(source, Arc::new(LoggingConsumer));
//! controller.add_fence("Home", Coordinate::new(37.0, -122.0)?, 100.0)?;
//! controller.start()?;
//!
//! feeder.push_position(37.0, -122.0)?; // -> on_fence_enter("Home")
//!
//! controller.stop();
//! ```

mod consumer;
mod stats;

pub use consumer::{ChannelConsumer, FenceConsumer, LoggingConsumer, Notification};
pub use stats::ControllerStats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coord::Coordinate;
use crate::fence::{
    ContainmentState, Fence, FenceEvaluator, FenceId, FenceRegistry, InitialOutsidePolicy,
    RegistryError, TransitionKind,
};
use crate::source::{PositionSource, SourceEvent, SourceSink};
use stats::StatsCounters;

/// Errors from controller lifecycle operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// `start` was called outside a Tokio runtime.
    #[error("Fence controller requires a Tokio runtime to start")]
    NoRuntime,
}

/// Controller configuration.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// What to report when a fence's first sample is outside it.
    pub initial_outside: InitialOutsidePolicy,
}

impl ControllerConfig {
    pub fn with_initial_outside(mut self, policy: InitialOutsidePolicy) -> Self {
        self.initial_outside = policy;
        self
    }
}

/// Registry and evaluator guarded together.
#[derive(Debug)]
struct FenceBook {
    registry: FenceRegistry,
    evaluator: FenceEvaluator,
}

/// State shared between the controller handle and its intake task.
struct Shared {
    book: Mutex<FenceBook>,
    intake: Mutex<()>,
    consumer: Arc<dyn FenceConsumer>,
    stats: StatsCounters,
    /// Set by `stop` and cleared by `start`.
    halted: AtomicBool,
}

impl Shared {
    /// Process one source event. `shutdown` is the intake task's token; once
    /// it is cancelled, or the controller has been stopped, nothing more
    /// reaches the consumer.
    fn process(&self, event: SourceEvent, shutdown: Option<&CancellationToken>) {
        let _intake = self.intake.lock();

        let halted = match shutdown {
            Some(token) => token.is_cancelled(),
            None => self.halted.load(Ordering::Acquire),
        };
        if halted {
            self.stats.events_dropped(1);
            return;
        }

        match event {
            SourceEvent::Sample(sample) => {
                self.consumer.on_position_update(
                    sample.coordinate.latitude(),
                    sample.coordinate.longitude(),
                );

                let transitions = {
                    let mut book = self.book.lock();
                    let FenceBook {
                        registry,
                        evaluator,
                    } = &mut *book;
                    evaluator.evaluate(&sample, registry)
                };
                self.stats.sample_processed();

                for event in &transitions {
                    match event.kind {
                        TransitionKind::Enter => {
                            self.stats.enter_emitted();
                            self.consumer.on_fence_enter(event);
                        }
                        TransitionKind::Exit => {
                            self.stats.exit_emitted();
                            self.consumer.on_fence_exit(event);
                        }
                    }
                }
            }
            SourceEvent::Fault(fault) => {
                warn!(
                    kind = %fault.kind,
                    code = fault.kind.legacy_code(),
                    description = %fault.description,
                    "Position source fault"
                );
                self.stats.fault_forwarded();
                self.consumer.on_fault(fault.kind, &fault.description);
            }
            SourceEvent::Status(text) => {
                debug!(status = %text, "Position source status");
                self.consumer.on_status_update(&text);
            }
        }
    }
}

/// Running intake task.
struct Intake {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Orchestrates a [`PositionSource`], the fence registry/evaluator and a
/// [`FenceConsumer`].
///
/// Fences and containment state survive `stop`/`start` cycles, so resuming
/// never produces spurious transitions.
pub struct FenceController<S: PositionSource> {
    shared: Arc<Shared>,
    source: S,
    intake: Option<Intake>,
}

impl<S: PositionSource> FenceController<S> {
    /// Create a stopped controller with default configuration.
    pub fn new(source: S, consumer: Arc<dyn FenceConsumer>) -> Self {
        Self::with_config(source, consumer, ControllerConfig::default())
    }

    pub fn with_config(
        source: S,
        consumer: Arc<dyn FenceConsumer>,
        config: ControllerConfig,
    ) -> Self {
        let book = FenceBook {
            registry: FenceRegistry::new(),
            evaluator: FenceEvaluator::with_policy(config.initial_outside),
        };

        Self {
            shared: Arc::new(Shared {
                book: Mutex::new(book),
                intake: Mutex::new(()),
                consumer,
                stats: StatsCounters::default(),
                halted: AtomicBool::new(false),
            }),
            source,
            intake: None,
        }
    }

    /// Start consuming position events. No-op if already running.
    ///
    /// Must be called from within a Tokio runtime; the intake loop runs as a
    /// task on it.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.intake.is_some() {
            debug!("Fence controller already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        self.shared.halted.store(false, Ordering::Release);
        let (sink, rx) = SourceSink::channel();
        let shutdown = CancellationToken::new();

        let handle = runtime.spawn(intake_loop(
            Arc::clone(&self.shared),
            rx,
            shutdown.clone(),
        ));
        self.intake = Some(Intake { shutdown, handle });

        let fences = self.shared.book.lock().registry.len();
        info!(
            source = self.source.name(),
            authorization = %self.source.authorization(),
            fences,
            "Fence monitoring started"
        );
        self.shared
            .consumer
            .on_status_update("Fence monitoring started");

        self.source.start(sink);
        Ok(())
    }

    /// Stop consuming position events.
    ///
    /// Returns immediately without waiting for in-flight callbacks. Fences
    /// and containment state are kept. Safe to call in any state.
    pub fn stop(&mut self) {
        let Some(intake) = self.intake.take() else {
            return;
        };

        self.shared.halted.store(true, Ordering::Release);
        intake.shutdown.cancel();
        self.source.stop();
        // The task exits on its own once it observes the cancellation.
        drop(intake.handle);

        info!(source = self.source.name(), "Fence monitoring stopped");
        self.shared
            .consumer
            .on_status_update("Fence monitoring stopped");
    }

    pub fn is_running(&self) -> bool {
        self.intake.is_some()
    }

    /// Register a fence. It starts in [`ContainmentState::Unknown`] and takes
    /// part from the next evaluated sample.
    pub fn add_fence(
        &self,
        name: &str,
        center: Coordinate,
        radius_m: f64,
    ) -> Result<FenceId, RegistryError> {
        let id = self.shared.book.lock().registry.add(name, center, radius_m)?;
        info!(fence = name, center = %center, radius_m, "Fence added");
        Ok(id)
    }

    /// Remove a fence and discard its containment state.
    ///
    /// Removal never produces a transition event.
    pub fn remove_fence(&self, name: &str) -> Result<(), RegistryError> {
        let mut book = self.shared.book.lock();
        let fence = book.registry.remove(name)?;
        book.evaluator.forget(fence.id());
        drop(book);

        info!(fence = name, "Fence removed");
        Ok(())
    }

    /// Snapshot of the registered fences in registration order.
    pub fn fences(&self) -> Vec<Fence> {
        self.shared.book.lock().registry.list().cloned().collect()
    }

    /// Current containment for a fence, or `None` if no such fence exists.
    pub fn containment(&self, name: &str) -> Option<ContainmentState> {
        let book = self.shared.book.lock();
        let id = book.registry.get(name)?.id();
        Some(book.evaluator.state(id))
    }

    pub fn stats(&self) -> ControllerStats {
        self.shared.stats.snapshot()
    }

    /// Process a source event synchronously on the caller's thread.
    ///
    /// This is the same path the intake task uses. Hosts that run their own
    /// single-threaded event loop can call it directly instead of `start`.
    /// Once a started controller has been stopped, events are dropped and
    /// counted in [`ControllerStats::events_dropped`] until the next `start`.
    pub fn handle_event(&self, event: SourceEvent) {
        self.shared.process(event, None);
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: PositionSource> Drop for FenceController<S> {
    fn drop(&mut self) {
        if let Some(intake) = self.intake.take() {
            intake.shutdown.cancel();
            self.source.stop();
        }
    }
}

async fn intake_loop(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<SourceEvent>,
    shutdown: CancellationToken,
) {
    debug!("Fence intake loop starting");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            event = rx.recv() => match event {
                Some(event) => shared.process(event, Some(&shutdown)),
                None => {
                    debug!("Position source closed its sink");
                    break;
                }
            },
        }
    }

    // Anything still queued arrived after stop.
    rx.close();
    let mut dropped = 0;
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        shared.stats.events_dropped(dropped);
        debug!(dropped, "Discarded queued source events after stop");
    }

    debug!("Fence intake loop stopped");
}
