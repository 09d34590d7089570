//! # Forecourt Core
//!
//! Global ranking and pagination for a vehicle listing catalog whose upstream
//! can only serve unsorted pages.
//!
//! ## Overview
//!
//! A filtered listing set is aggregated in full from a [`PagedSource`],
//! ranked once under the active [`SortMode`](forecourt_model::SortMode) and
//! then sliced into pages. The worst listing on page N never outranks the
//! best listing on page N+1, however the source delivered them.
//!
//! ## Architecture
//!
//! - [`query::sorting`]: sort keys, extraction and the total-order comparator
//! - [`query::ranking`]: dense global ranks over a complete set
//! - [`query::bulk_fetch`]: chunked aggregation from the paged source
//! - [`query::paging`]: page slicing with clamping
//! - [`catalog`]: the session boundary with generation-based cancellation
//! - [`source`]: the paged-fetch port and its adapters
//! - [`config`]: file and environment configuration
//!
//! ## Example
//!
//! ```no_run
//! use forecourt_core::{
//!     CatalogSession, MemorySource, PageState, RankingConfigLoader,
//! };
//! use forecourt_model::{FilterSet, SortMode};
//!
//! async fn cheapest_toyotas(
//!     source: MemorySource,
//! ) -> forecourt_core::Result<()> {
//!     let config = RankingConfigLoader::new().load()?.config;
//!     let session = CatalogSession::new(source, &config);
//!     session.set_filter(FilterSet::new().with_make("Toyota"));
//!     session.set_sort_mode(SortMode::PriceAsc);
//!
//!     if let PageState::Ready(page) = session.request_page(1).await? {
//!         for ranked in &page.items {
//!             println!("#{} {}", ranked.rank, ranked.record.id);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
#![allow(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod source;

pub use catalog::{
    CatalogSession, GenerationCounter, GenerationGuard, PageState,
    SessionStatus, StalePage,
};
pub use config::{ConfigLoad, ConfigLoadError, RankingConfig, RankingConfigLoader};
pub use error::{CatalogError, FetchError, Result};
pub use query::{
    BulkFetchCoordinator, PageView, PagingView, RankKey, RankedRecord,
    RankedSequence, RankingEngine, compare, extract_key,
};
pub use source::{ChunkTimeout, FetchedPage, MemorySource, PagedSource, TimeoutSource};
