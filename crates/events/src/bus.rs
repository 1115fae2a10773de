//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application. The
//! ledger publishes [`GamificationEvent`]s; subscribers such as the
//! [`CelebrationQueue`](crate::celebrations::CelebrationQueue) consume them.

use bilim_core::celebration::CelebrationKind;
use bilim_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// GamificationEvent
// ---------------------------------------------------------------------------

/// Something worth celebrating happened to a learner.
///
/// Constructed via [`GamificationEvent::new`] and enriched with
/// [`with_title`](GamificationEvent::with_title),
/// [`with_points`](GamificationEvent::with_points), and
/// [`with_payload`](GamificationEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationEvent {
    pub kind: CelebrationKind,

    /// Learner the event belongs to.
    pub user_id: DbId,

    /// Overrides the kind's default title when set.
    pub title: Option<String>,

    pub message: String,

    /// Points associated with the event, if any.
    pub points: Option<i64>,

    /// Kind-specific data (achievement name, new level, streak length, ...).
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl GamificationEvent {
    pub fn new(kind: CelebrationKind, user_id: DbId, message: impl Into<String>) -> Self {
        Self {
            kind,
            user_id,
            title: None,
            message: message.into(),
            points: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Dot-separated event name, e.g. `"gamification.level_up"`.
    pub fn event_type(&self) -> String {
        self.kind.event_type()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`GamificationEvent`].
///
/// # Usage
///
/// ```rust
/// use bilim_core::celebration::CelebrationKind;
/// use bilim_events::bus::{EventBus, GamificationEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(GamificationEvent::new(CelebrationKind::LevelUp, 1, "Level 2"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<GamificationEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is dropped.
    pub fn publish(&self, event: GamificationEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GamificationEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
