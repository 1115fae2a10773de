//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async data-access
//! methods. Read paths take `&PgPool`; methods the ledger calls inside its
//! transaction accept any [`sqlx::PgExecutor`] so callers can pass either
//! the pool or `&mut *tx`.

pub mod achievement_repo;
pub mod lesson_progress_repo;
pub mod profile_repo;
pub mod topic_progress_repo;
pub mod topic_repo;
pub mod user_test_repo;

pub use achievement_repo::AchievementRepo;
pub use lesson_progress_repo::LessonProgressRepo;
pub use profile_repo::ProfileRepo;
pub use topic_progress_repo::TopicProgressRepo;
pub use topic_repo::TopicRepo;
pub use user_test_repo::UserTestRepo;
