//! Replay command - run a recorded track through the configured fences.
//!
//! Notifications are printed as they arrive, either as text or one JSON
//! object per line. The run ends when the track is exhausted, a terminal
//! source fault arrives, or the user presses Ctrl+C; a summary of the
//! controller counters is printed last.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use geofence::config::ConfigFile;
use geofence::controller::{ChannelConsumer, ControllerStats, FenceController, Notification};
use geofence::coord::Coordinate;
use geofence::fence::InitialOutsidePolicy;
use geofence::source::{
    ReplayConfig, ReplaySource, DEFAULT_REPLAY_INTERVAL, REPLAY_FINISHED_STATUS,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::start_logging;
use crate::error::CliError;
use crate::track::load_track;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub config: PathBuf,
    pub track: PathBuf,
    pub interval_ms: Option<u64>,
    pub json: bool,
    pub positions: bool,
    pub report_initial_outside: bool,
    pub verbose: bool,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let config = ConfigFile::load(&args.config)?;
    let _guard = start_logging(&config.logging, args.verbose, "replay")?;

    let track = load_track(&args.track)?;
    info!(
        track = %args.track.display(),
        samples = track.len(),
        fences = config.fences.len(),
        "Loaded replay inputs"
    );

    let interrupt = CancellationToken::new();
    let interrupt_clone = interrupt.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received shutdown signal, stopping replay...");
        interrupt_clone.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(replay(&config, track, &args, interrupt))
}

async fn replay(
    config: &ConfigFile,
    track: Vec<Coordinate>,
    args: &ReplayArgs,
    interrupt: CancellationToken,
) -> Result<(), CliError> {
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_REPLAY_INTERVAL);
    let source =
        ReplaySource::with_config(track, ReplayConfig::default().with_interval(interval));

    let mut controller_config = config.controller_config();
    if args.report_initial_outside {
        controller_config =
            controller_config.with_initial_outside(InitialOutsidePolicy::ReportExit);
    }

    let (consumer, mut rx) = ChannelConsumer::new();
    let mut controller =
        FenceController::with_config(source, Arc::new(consumer), controller_config);
    config.apply_fences(&controller)?;
    controller.start()?;

    let output = OutputOptions {
        json: args.json,
        positions: args.positions,
    };

    let outcome = loop {
        tokio::select! {
            biased;

            _ = interrupt.cancelled() => {
                warn!("Interrupted, stopping replay");
                break Ok(());
            }
            notification = rx.recv() => {
                let Some(notification) = notification else {
                    break Ok(());
                };
                if let Some(line) = output.format(&notification)? {
                    println!("{}", line);
                }
                match notification {
                    Notification::Status { text } if text == REPLAY_FINISHED_STATUS => {
                        break Ok(());
                    }
                    Notification::Fault { kind, description } if kind.is_terminal() => {
                        break Err(CliError::SourceFault(format!("{}: {}", kind, description)));
                    }
                    _ => {}
                }
            }
        }
    };

    controller.stop();
    println!("{}", output.summary(&controller.stats())?);
    outcome
}

/// How notifications are rendered.
#[derive(Debug, Clone, Copy)]
struct OutputOptions {
    json: bool,
    positions: bool,
}

impl OutputOptions {
    /// Render one notification, or `None` if it is filtered out.
    fn format(&self, notification: &Notification) -> Result<Option<String>, CliError> {
        if matches!(notification, Notification::Position { .. }) && !self.positions {
            return Ok(None);
        }
        if self.json {
            return Ok(Some(serde_json::to_string(notification)?));
        }

        let line = match notification {
            Notification::Status { text } => format!("status    {}", text),
            Notification::Enter(event) | Notification::Exit(event) => {
                format!("event     {}", event)
            }
            Notification::Position {
                latitude,
                longitude,
            } => format!("position  {:.6}, {:.6}", latitude, longitude),
            Notification::Fault { kind, description } => {
                format!("fault     {}: {}", kind, description)
            }
        };
        Ok(Some(line))
    }

    fn summary(&self, stats: &ControllerStats) -> Result<String, CliError> {
        if self.json {
            let value = serde_json::json!({ "type": "summary", "stats": stats });
            return Ok(serde_json::to_string(&value)?);
        }
        Ok(format!("Summary: {}", stats))
    }
}
