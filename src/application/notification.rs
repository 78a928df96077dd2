//! Outward notifications from the call-session controller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::call::ActionSet;
use crate::domain::log::LogEntry;
use crate::domain::shared::events::{DomainEvent, EventMetadata};
use crate::domain::shared::value_objects::ProviderCallId;

/// What changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotification {
    LogEmitted { entry: LogEntry },
    ActionSetChanged { actions: ActionSet },
    IdentityResolved { identity: String },
    CallIdChanged { call_id: Option<ProviderCallId> },
}

impl SessionNotification {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionNotification::LogEmitted { .. } => "session.log_emitted",
            SessionNotification::ActionSetChanged { .. } => "session.action_set_changed",
            SessionNotification::IdentityResolved { .. } => "session.identity_resolved",
            SessionNotification::CallIdChanged { .. } => "session.call_id_changed",
        }
    }
}

/// Notification with its event metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub metadata: EventMetadata,
    pub notification: SessionNotification,
}

impl SessionEvent {
    pub fn new(notification: SessionNotification) -> Self {
        Self {
            metadata: EventMetadata::new(notification.event_type()),
            notification,
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.notification.event_type()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }
}

/// Fan-out of session events to presenters
pub struct NotificationBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl NotificationBroadcaster {
    /// Create new broadcaster with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notification: SessionNotification) {
        // No subscriber is a normal condition (headless use, tests)
        if let Err(e) = self.tx.send(SessionEvent::new(notification)) {
            debug!("Dropped session notification: {}", e.0.notification.event_type());
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::Action;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broadcaster = NotificationBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.publish(SessionNotification::ActionSetChanged {
            actions: ActionSet::only(Action::Call),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "session.action_set_changed");
        assert_eq!(event.metadata.event_type, "session.action_set_changed");
        assert_eq!(
            event.notification,
            SessionNotification::ActionSetChanged {
                actions: ActionSet::only(Action::Call)
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let broadcaster = NotificationBroadcaster::new(4);
        broadcaster.publish(SessionNotification::IdentityResolved {
            identity: "alice".to_string(),
        });
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_notification_json_shape() {
        let json = serde_json::to_value(SessionNotification::IdentityResolved {
            identity: "alice".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "identity_resolved");
        assert_eq!(json["identity"], "alice");
    }
}
