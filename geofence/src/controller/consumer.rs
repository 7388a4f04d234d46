//! Consumer-facing notification protocol.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::fence::TransitionEvent;
use crate::source::FaultKind;

/// Receives notifications from a [`FenceController`](super::FenceController).
///
/// Callbacks run on the controller's intake task, one at a time and in the
/// order the underlying source events arrived. A callback may add or remove
/// fences, but must not call
/// [`handle_event`](super::FenceController::handle_event) re-entrantly.
pub trait FenceConsumer: Send + Sync {
    /// Best-effort human-readable status.
    fn on_status_update(&self, _text: &str) {}

    fn on_fence_enter(&self, event: &TransitionEvent);

    fn on_fence_exit(&self, event: &TransitionEvent);

    /// Raw pass-through of every accepted sample.
    fn on_position_update(&self, _latitude: f64, _longitude: f64) {}

    /// Exactly one call per fault reported by the source.
    fn on_fault(&self, kind: FaultKind, description: &str);
}

impl<C: FenceConsumer + ?Sized> FenceConsumer for Arc<C> {
    fn on_status_update(&self, text: &str) {
        (**self).on_status_update(text)
    }

    fn on_fence_enter(&self, event: &TransitionEvent) {
        (**self).on_fence_enter(event)
    }

    fn on_fence_exit(&self, event: &TransitionEvent) {
        (**self).on_fence_exit(event)
    }

    fn on_position_update(&self, latitude: f64, longitude: f64) {
        (**self).on_position_update(latitude, longitude)
    }

    fn on_fault(&self, kind: FaultKind, description: &str) {
        (**self).on_fault(kind, description)
    }
}

/// A consumer notification as a value, for queue-based consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Status { text: String },
    Enter(TransitionEvent),
    Exit(TransitionEvent),
    Position { latitude: f64, longitude: f64 },
    Fault { kind: FaultKind, description: String },
}

/// Consumer that forwards every notification into an unbounded channel.
///
/// Useful when the host wants to poll or `await` notifications instead of
/// handling callbacks. Notifications sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelConsumer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, notification: Notification) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.tx.send(notification);
    }
}

impl FenceConsumer for ChannelConsumer {
    fn on_status_update(&self, text: &str) {
        self.send(Notification::Status {
            text: text.to_string(),
        });
    }

    fn on_fence_enter(&self, event: &TransitionEvent) {
        self.send(Notification::Enter(event.clone()));
    }

    fn on_fence_exit(&self, event: &TransitionEvent) {
        self.send(Notification::Exit(event.clone()));
    }

    fn on_position_update(&self, latitude: f64, longitude: f64) {
        self.send(Notification::Position {
            latitude,
            longitude,
        });
    }

    fn on_fault(&self, kind: FaultKind, description: &str) {
        self.send(Notification::Fault {
            kind,
            description: description.to_string(),
        });
    }
}

/// Consumer that only writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConsumer;

impl FenceConsumer for LoggingConsumer {
    fn on_status_update(&self, text: &str) {
        info!(status = text, "Status update");
    }

    fn on_fence_enter(&self, event: &TransitionEvent) {
        info!(fence = %event.fence_name, at = %event.coordinate, "Entered fence");
    }

    fn on_fence_exit(&self, event: &TransitionEvent) {
        info!(fence = %event.fence_name, at = %event.coordinate, "Exited fence");
    }

    fn on_fault(&self, kind: FaultKind, description: &str) {
        warn!(kind = %kind, code = kind.legacy_code(), description, "Position source fault");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::fence::{FenceId, TransitionKind};
    use chrono::Utc;

    fn enter_event() -> TransitionEvent {
        TransitionEvent {
            fence_id: FenceId(1),
            fence_name: "Home".to_string(),
            kind: TransitionKind::Enter,
            coordinate: Coordinate::new(37.0, -122.0).unwrap(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_channel_consumer_forwards_in_order() {
        let (consumer, mut rx) = ChannelConsumer::new();
        let event = enter_event();

        consumer.on_position_update(37.0, -122.0);
        consumer.on_fence_enter(&event);
        consumer.on_fault(FaultKind::ReadError, "no fix");

        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::Position {
                latitude: 37.0,
                longitude: -122.0
            }
        );
        assert_eq!(rx.try_recv().unwrap(), Notification::Enter(event));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::Fault {
                kind: FaultKind::ReadError,
                description: "no fix".to_string()
            }
        );
    }

    #[test]
    fn test_channel_consumer_ignores_dropped_receiver() {
        let (consumer, rx) = ChannelConsumer::new();
        drop(rx);
        consumer.on_status_update("still fine");
    }

    #[test]
    fn test_notification_json_shape() {
        let json = serde_json::to_value(Notification::Fault {
            kind: FaultKind::AuthorizationDenied,
            description: "denied".to_string(),
        })
        .unwrap();

        assert_eq!(json["type"], "fault");
        assert_eq!(json["kind"], "authorization_denied");

        let json = serde_json::to_value(Notification::Enter(enter_event())).unwrap();
        assert_eq!(json["type"], "enter");
        assert_eq!(json["fence_name"], "Home");
        assert_eq!(json["kind"], "enter");
    }
}
