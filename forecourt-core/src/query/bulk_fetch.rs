//! Acquisition of the complete filtered set from a paged source.
//!
//! Ranking needs every matching listing before it can order anything, so the
//! coordinator walks the source chunk by chunk and aggregates by id. Any
//! failure discards the aggregate: callers get the whole set or an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use forecourt_model::{FilterSet, Listing, ListingId, SortMode};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::catalog::GenerationGuard;
use crate::config::RankingConfig;
use crate::error::FetchError;
use crate::source::{ChunkTimeout, FetchedPage, PagedSource};

#[derive(Debug, Clone)]
pub struct BulkFetchCoordinator<S> {
    source: S,
    chunk_size: usize,
    max_in_flight: usize,
    fetch_timeout: Option<Duration>,
}

impl<S> BulkFetchCoordinator<S>
where
    S: PagedSource,
{
    /// Zero sizes are raised to one.
    pub fn new(source: S, chunk_size: usize, max_in_flight: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
            max_in_flight: max_in_flight.max(1),
            fetch_timeout: None,
        }
    }

    /// Coordinator with the configured sizes and per-chunk timeout.
    pub fn from_config(source: S, config: &RankingConfig) -> Self {
        Self::new(source, config.chunk_size, config.max_in_flight)
            .with_fetch_timeout(config.fetch_timeout)
    }

    /// Bound every chunk fetch; a chunk that overruns fails the cycle with
    /// [`FetchError::Timeout`].
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Complete `already_held` up to `total_count` listings.
    ///
    /// Returns `already_held` untouched when it already covers the total.
    /// Otherwise chunks are fetched from page 1 and merged with the held
    /// listings by id until the total is reached or the source runs dry.
    pub async fn ensure_full_set(
        &self,
        filters: &FilterSet,
        already_held: Vec<Arc<Listing>>,
        total_count: usize,
        sort: SortMode,
        guard: &GenerationGuard,
    ) -> Result<Vec<Arc<Listing>>, FetchError> {
        if already_held.len() >= total_count {
            debug!(
                held = already_held.len(),
                total = total_count,
                "held listings cover the filtered set"
            );
            return Ok(already_held);
        }

        let mut aggregate = Aggregate::new(total_count);
        aggregate.absorb(already_held);

        let result = match guard.ensure_current() {
            Ok(()) => self.aggregate_from(filters, sort, guard, aggregate, 1).await,
            Err(err) => Err(err),
        };
        result.inspect_err(|err| self.report_failure(filters, sort, err))
    }

    /// Fetch the complete filtered set without any held listings.
    ///
    /// Page 1 supplies the total; the remaining pages follow through the
    /// same aggregation as [`ensure_full_set`](Self::ensure_full_set).
    pub async fn fetch_all(
        &self,
        filters: &FilterSet,
        sort: SortMode,
        guard: &GenerationGuard,
    ) -> Result<Vec<Arc<Listing>>, FetchError> {
        self.fetch_all_inner(filters, sort, guard)
            .await
            .inspect_err(|err| self.report_failure(filters, sort, err))
    }

    async fn fetch_all_inner(
        &self,
        filters: &FilterSet,
        sort: SortMode,
        guard: &GenerationGuard,
    ) -> Result<Vec<Arc<Listing>>, FetchError> {
        guard.ensure_current()?;
        let first = self.fetch_chunk(filters, 1, sort).await?;
        guard.ensure_current()?;

        let exhausted = first.items.len() < self.chunk_size;
        let mut aggregate = Aggregate::new(first.total);
        aggregate.accept(1, first)?;

        if exhausted || aggregate.is_complete() {
            return aggregate.finish();
        }
        self.aggregate_from(filters, sort, guard, aggregate, 2).await
    }

    async fn aggregate_from(
        &self,
        filters: &FilterSet,
        sort: SortMode,
        guard: &GenerationGuard,
        mut aggregate: Aggregate,
        first_page: usize,
    ) -> Result<Vec<Arc<Listing>>, FetchError> {
        let last_page = aggregate.expected.div_ceil(self.chunk_size);

        if self.max_in_flight == 1 {
            let mut page = first_page;
            while page <= last_page && !aggregate.is_complete() {
                let chunk = self.fetch_chunk(filters, page, sort).await?;
                guard.ensure_current()?;

                let exhausted = chunk.items.len() < self.chunk_size;
                aggregate.accept(page, chunk)?;
                if exhausted {
                    break;
                }
                page += 1;
            }
            return aggregate.finish();
        }

        // Dropping the stream on the first error cancels the chunks still in
        // flight.
        let mut chunks = stream::iter(first_page..=last_page)
            .map(|page| async move {
                (page, self.fetch_chunk(filters, page, sort).await)
            })
            .buffer_unordered(self.max_in_flight);

        while let Some((page, result)) = chunks.next().await {
            let chunk = result?;
            guard.ensure_current()?;
            aggregate.accept(page, chunk)?;
        }
        aggregate.finish()
    }

    async fn fetch_chunk(
        &self,
        filters: &FilterSet,
        page: usize,
        sort: SortMode,
    ) -> Result<FetchedPage, FetchError> {
        let fetch = self.source.fetch_page(filters, page, self.chunk_size, sort);
        let fetched = match self.fetch_timeout {
            Some(after) => match tokio::time::timeout(after, fetch).await {
                Ok(fetched) => fetched,
                Err(_) => return Err(FetchError::Timeout { page, after }),
            },
            None => fetch.await,
        };

        fetched.map_err(|source| {
            if let Some(timeout) = source.downcast_ref::<ChunkTimeout>().copied() {
                return FetchError::Timeout {
                    page: timeout.page,
                    after: timeout.after,
                };
            }
            FetchError::Source { page, source }
        })
    }

    fn report_failure(&self, filters: &FilterSet, sort: SortMode, err: &FetchError) {
        match err {
            FetchError::Superseded { current } => warn!(
                filters = filters.fingerprint(),
                sort = %sort,
                current,
                "bulk fetch superseded; aggregate discarded"
            ),
            _ => warn!(
                filters = filters.fingerprint(),
                sort = %sort,
                error = %err,
                "bulk fetch failed; aggregate discarded"
            ),
        }
    }
}

/// Listings gathered so far in one cycle, unique by id.
#[derive(Debug)]
struct Aggregate {
    expected: usize,
    seen: HashSet<ListingId>,
    records: Vec<Arc<Listing>>,
    duplicates: usize,
}

impl Aggregate {
    fn new(expected: usize) -> Self {
        Self {
            expected,
            seen: HashSet::with_capacity(expected),
            records: Vec::with_capacity(expected),
            duplicates: 0,
        }
    }

    fn absorb(&mut self, items: Vec<Arc<Listing>>) {
        for item in items {
            if self.seen.insert(item.id.clone()) {
                self.records.push(item);
            } else {
                self.duplicates += 1;
            }
        }
    }

    fn accept(&mut self, page: usize, chunk: FetchedPage) -> Result<(), FetchError> {
        if chunk.total != self.expected {
            return Err(FetchError::TotalDrift {
                expected: self.expected,
                reported: chunk.total,
                page,
            });
        }

        let received = chunk.items.len();
        self.absorb(chunk.items);
        debug!(
            page,
            received,
            aggregated = self.records.len(),
            expected = self.expected,
            "chunk aggregated"
        );
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.records.len() >= self.expected
    }

    fn finish(self) -> Result<Vec<Arc<Listing>>, FetchError> {
        if self.records.len() != self.expected {
            return Err(FetchError::CountMismatch {
                expected: self.expected,
                received: self.records.len(),
            });
        }
        if self.duplicates > 0 {
            debug!(
                duplicates = self.duplicates,
                total = self.expected,
                "dropped duplicate listings across chunks"
            );
        }
        Ok(self.records)
    }
}
