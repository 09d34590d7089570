use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_CHUNK_SIZE: usize = 200;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved tuning knobs for one catalog session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingConfig {
    /// Listings per page served to the rendering layer.
    pub page_size: usize,
    /// Listings requested per chunk from the paged source.
    pub chunk_size: usize,
    /// Chunk fetches allowed in flight at once; 1 means strictly sequential.
    pub max_in_flight: usize,
    /// Per-chunk timeout applied by the bulk fetch coordinator.
    pub fetch_timeout: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
