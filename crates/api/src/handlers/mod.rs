pub mod achievements;
pub mod activity;
pub mod attempts;
pub mod celebrations;
pub mod leaderboard;
pub mod lessons;
pub mod profile;
pub mod stats;
pub mod topics;
