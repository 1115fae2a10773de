//! Gamification event bus and celebration queue.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`GamificationEvent`]: what the ledger publishes after each change.
//! - [`CelebrationQueue`]: background subscriber that keeps pending
//!   celebrations per learner until they are dismissed.

pub mod bus;
pub mod celebrations;

pub use bus::{EventBus, GamificationEvent};
pub use celebrations::{Celebration, CelebrationQueue};
