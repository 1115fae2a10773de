use std::sync::Arc;

use bilim_events::{CelebrationQueue, EventBus};

use crate::config::ServerConfig;
use crate::mini_tests::MiniTestManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bilim_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Bus the ledger publishes gamification events on.
    pub event_bus: Arc<EventBus>,
    /// Pending celebrations, fed by a bus subscriber.
    pub celebrations: Arc<CelebrationQueue>,
    /// In-memory adaptive mini-test sessions.
    pub mini_tests: Arc<MiniTestManager>,
}
