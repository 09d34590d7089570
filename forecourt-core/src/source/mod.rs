//! The paged-fetch port and its adapters.
//!
//! The engine consumes listings only through [`PagedSource`]. Transport,
//! storage and filter evaluation belong to implementations of that trait.

pub mod memory;
pub mod timeout;

pub use memory::MemorySource;
pub use timeout::{ChunkTimeout, TimeoutSource};

use std::sync::Arc;

use async_trait::async_trait;
use forecourt_model::{FilterSet, Listing, SortMode};

/// One page as returned by a paged source.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub items: Vec<Arc<Listing>>,
    /// Count of all listings matching the filters, independent of paging.
    pub total: usize,
}

/// Paged access to the filtered listing population.
///
/// `page` is 1-based. Implementations own transport concerns such as
/// timeouts and authentication; the engine makes exactly one call per chunk
/// and never retries.
#[async_trait]
pub trait PagedSource: Send + Sync {
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        page: usize,
        page_size: usize,
        sort: SortMode,
    ) -> anyhow::Result<FetchedPage>;
}

#[async_trait]
impl<S> PagedSource for Arc<S>
where
    S: PagedSource + ?Sized,
{
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        page: usize,
        page_size: usize,
        sort: SortMode,
    ) -> anyhow::Result<FetchedPage> {
        (**self).fetch_page(filters, page, page_size, sort).await
    }
}
