//! Pending celebrations per learner.
//!
//! [`CelebrationQueue`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and turns every [`GamificationEvent`] into a [`Celebration`] the client
//! can show as a toast. Celebrations stay queued until the learner dismisses
//! them. The queue lives in memory only; a restart drops anything pending.

use std::collections::HashMap;

use bilim_core::celebration::CelebrationKind;
use bilim_core::types::{DbId, Timestamp};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::bus::GamificationEvent;

/// Oldest celebrations are dropped once a learner has this many pending.
pub const MAX_PENDING_PER_USER: usize = 50;

/// A toast waiting to be shown to a learner.
#[derive(Debug, Clone, Serialize)]
pub struct Celebration {
    pub id: Uuid,
    pub kind: CelebrationKind,
    pub title: String,
    pub message: String,
    pub points: Option<i64>,
    pub icon: &'static str,
    pub color: &'static str,
    pub confetti: bool,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

impl From<GamificationEvent> for Celebration {
    fn from(event: GamificationEvent) -> Self {
        let presentation = event.kind.presentation();
        Self {
            id: Uuid::new_v4(),
            kind: event.kind,
            title: event
                .title
                .unwrap_or_else(|| presentation.default_title.to_string()),
            message: event.message,
            points: event.points,
            icon: presentation.icon,
            color: presentation.color,
            confetti: presentation.confetti,
            payload: event.payload,
            created_at: event.timestamp,
        }
    }
}

/// In-memory per-learner celebration store.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` to share between the
/// subscriber task and request handlers.
pub struct CelebrationQueue {
    pending: RwLock<HashMap<DbId, Vec<Celebration>>>,
}

impl CelebrationQueue {
    pub fn new() -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Run the subscriber loop.
    ///
    /// Queues every event received on `receiver`. The loop exits when the
    /// bus is dropped.
    pub async fn run(&self, mut receiver: broadcast::Receiver<GamificationEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        user_id = event.user_id,
                        event_type = %event.event_type(),
                        "Queueing celebration"
                    );
                    self.push(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Celebration queue lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, celebration queue shutting down");
                    break;
                }
            }
        }
    }

    /// Queue a celebration for the event's learner.
    pub async fn push(&self, event: GamificationEvent) -> Uuid {
        let user_id = event.user_id;
        let celebration = Celebration::from(event);
        let id = celebration.id;

        let mut pending = self.pending.write().await;
        let queue = pending.entry(user_id).or_default();
        queue.push(celebration);
        if queue.len() > MAX_PENDING_PER_USER {
            let excess = queue.len() - MAX_PENDING_PER_USER;
            queue.drain(..excess);
        }
        id
    }

    /// Pending celebrations for a learner, oldest first.
    pub async fn list(&self, user_id: DbId) -> Vec<Celebration> {
        self.pending
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove one celebration. Returns `false` if the learner has no
    /// pending celebration with that id.
    pub async fn dismiss(&self, user_id: DbId, id: Uuid) -> bool {
        let mut pending = self.pending.write().await;
        let Some(queue) = pending.get_mut(&user_id) else {
            return false;
        };
        let before = queue.len();
        queue.retain(|c| c.id != id);
        let removed = queue.len() < before;
        if queue.is_empty() {
            pending.remove(&user_id);
        }
        removed
    }

    /// Remove every pending celebration for a learner.
    pub async fn dismiss_all(&self, user_id: DbId) -> usize {
        self.pending
            .write()
            .await
            .remove(&user_id)
            .map_or(0, |queue| queue.len())
    }
}

impl Default for CelebrationQueue {
    fn default() -> Self {
        Self::new()
    }
}
