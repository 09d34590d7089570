//! Ranking configuration: TOML file, `.env` and environment overrides.

pub mod loader;
pub mod models;
pub mod sources;

pub use loader::{ConfigLoad, ConfigLoadError, RankingConfigLoader};
pub use models::RankingConfig;
