//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` with the limit clamped to `1..=MAX_PAGE_SIZE` and a
    /// non-negative offset.
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Optional `?subject=` filter for topic listings.
#[derive(Debug, Default, Deserialize)]
pub struct SubjectParams {
    pub subject: Option<String>,
}
