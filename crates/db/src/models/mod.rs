//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and, where the table is written from request data, a
//! `Deserialize` DTO for inserts.

pub mod achievement;
pub mod lesson_progress;
pub mod profile;
pub mod topic;
pub mod topic_progress;
