//! Topic catalogue models and DTOs.

use bilim_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `topics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: DbId,
    pub subject: String,
    pub title: String,
    pub title_local: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a topic.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopic {
    pub subject: String,
    pub title: String,
    pub title_local: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}
