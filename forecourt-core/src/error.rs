use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigLoadError;
use forecourt_model::ModelError;

/// Failure while aggregating the full filtered set from the paged source.
///
/// Every variant means the aggregate is incomplete; no ranked sequence is
/// built from it.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("chunk fetch for page {page} failed: {source}")]
    Source {
        page: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("chunk fetch for page {page} timed out after {after:?}")]
    Timeout { page: usize, after: Duration },

    #[error("source reported {expected} listings but aggregation produced {received}")]
    CountMismatch { expected: usize, received: usize },

    #[error(
        "source total changed from {expected} to {reported} while fetching page {page}"
    )]
    TotalDrift {
        expected: usize,
        reported: usize,
        page: usize,
    },

    #[error("aggregation superseded by generation {current}")]
    Superseded { current: u64 },
}

impl FetchError {
    /// Whether retrying the same cycle could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Source { .. }
                | FetchError::Timeout { .. }
                | FetchError::TotalDrift { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
