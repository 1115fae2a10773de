//! Pure domain rules for the Bilim learner-progress service.
//!
//! Nothing in this crate touches the database or the network. The ledger
//! engine in `bilim-api` composes these rules with the repositories in
//! `bilim-db`.

pub mod achievements;
pub mod adaptive;
pub mod celebration;
pub mod error;
pub mod gamification;
pub mod mastery;
pub mod ranking;
pub mod roles;
pub mod scoring;
pub mod types;
