//! Data-access core for the meal tracker.
//! This crate is the single source of truth for persistence behavior.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::meal::{MealId, MealModel, Mood};
pub use model::tag::{TagId, TagModel};
pub use repo::meal_repo::{MealRepository, RepoError, RepoResult, SqliteMealRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use service::data_service::{MealDataService, TagRanking};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
