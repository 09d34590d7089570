use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub ranking: FileRankingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRankingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
    /// Humantime duration such as `"30s"` or `"1m 30s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub chunk_size: Option<usize>,
    pub max_in_flight: Option<usize>,
    pub fetch_timeout: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("FORECOURT_CONFIG")
                .ok()
                .map(PathBuf::from),
            page_size: parse_usize_var("FORECOURT_PAGE_SIZE"),
            chunk_size: parse_usize_var("FORECOURT_CHUNK_SIZE"),
            max_in_flight: parse_usize_var("FORECOURT_MAX_IN_FLIGHT"),
            fetch_timeout: std::env::var("FORECOURT_FETCH_TIMEOUT")
                .ok()
                .filter(|raw| !raw.trim().is_empty()),
        }
    }
}

fn parse_usize_var(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring non-numeric environment override");
            None
        }
    }
}
