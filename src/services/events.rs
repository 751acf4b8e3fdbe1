//! Change-event fan-out for scheduling data.
//!
//! The scheduling queries are plain request/response; this module provides
//! the subscription seam for collaborators that want to re-poll on change
//! instead of on a timer. Events carry identifiers only, never record
//! bodies: subscribers re-read through the query operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::api::{ConflictId, OrganizationId, ScheduleId};

/// Default buffered capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    ScheduleCreated,
    ScheduleRescheduled,
    ScheduleStatusChanged,
    DayStatusChanged,
    AvailabilityChanged,
    ConflictRecorded,
    ConflictResolved,
}

/// A single mutation notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_id: Uuid,
    pub organization_id: OrganizationId,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<ScheduleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_id: Option<ConflictId>,
    pub timestamp: DateTime<Utc>,
}

/// In-process pub/sub bus for scheduling mutations.
///
/// Wraps a tokio broadcast channel; publishing never blocks and events are
/// dropped silently when nobody is subscribed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publish a mutation notification.
    pub fn publish(
        &self,
        organization_id: OrganizationId,
        kind: ChangeKind,
        schedule_id: Option<ScheduleId>,
        conflict_id: Option<ConflictId>,
    ) -> ChangeEvent {
        let event = ChangeEvent {
            event_id: Uuid::new_v4(),
            organization_id,
            kind,
            schedule_id,
            conflict_id,
            timestamp: Utc::now(),
        };
        // A send error only means there are currently no subscribers.
        let _ = self.sender.send(event.clone());
        event
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let sent = bus.publish(
            OrganizationId::new(1),
            ChangeKind::ScheduleCreated,
            Some(ScheduleId::new(5)),
            None,
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_id, sent.event_id);
        assert_eq!(received.kind, ChangeKind::ScheduleCreated);
        assert_eq!(received.schedule_id, Some(ScheduleId::new(5)));
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(OrganizationId::new(1), ChangeKind::AvailabilityChanged, None, None);
    }
}
