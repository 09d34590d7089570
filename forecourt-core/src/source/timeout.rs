use std::time::Duration;

use async_trait::async_trait;
use forecourt_model::{FilterSet, SortMode};
use thiserror::Error;

use super::{FetchedPage, PagedSource};

/// Error carried inside the `anyhow::Error` of a timed-out chunk, so the
/// coordinator can report it as a timeout rather than a generic failure.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("page {page} did not arrive within {after:?}")]
pub struct ChunkTimeout {
    pub page: usize,
    pub after: Duration,
}

/// Bounds every chunk fetch of the wrapped source.
#[derive(Debug, Clone)]
pub struct TimeoutSource<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutSource<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S> PagedSource for TimeoutSource<S>
where
    S: PagedSource,
{
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        page: usize,
        page_size: usize,
        sort: SortMode,
    ) -> anyhow::Result<FetchedPage> {
        match tokio::time::timeout(
            self.timeout,
            self.inner.fetch_page(filters, page, page_size, sort),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ChunkTimeout {
                page,
                after: self.timeout,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl PagedSource for Stalled {
        async fn fetch_page(
            &self,
            _filters: &FilterSet,
            _page: usize,
            _page_size: usize,
            _sort: SortMode,
        ) -> anyhow::Result<FetchedPage> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(FetchedPage::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_chunk_times_out() {
        let source = TimeoutSource::new(Stalled, Duration::from_millis(250));
        let err = source
            .fetch_page(&FilterSet::new(), 3, 10, SortMode::PriceAsc)
            .await
            .unwrap_err();

        let timeout = err.downcast_ref::<ChunkTimeout>().copied();
        assert_eq!(
            timeout,
            Some(ChunkTimeout {
                page: 3,
                after: Duration::from_millis(250)
            })
        );
    }
}
