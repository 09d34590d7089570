//! The rendering-layer boundary: filter, sort and page requests.
//!
//! A session owns the explicit `(filters, sort_mode, generation)` state. Every
//! change advances the generation, which invalidates the ranked sequence and
//! any cycle still in flight. The next [`CatalogSession::request_page`] runs a
//! new cycle: bulk fetch, rank once, then slice.

use std::sync::Arc;

use forecourt_model::{FilterSet, Listing, SortMode};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::generation::{GenerationCounter, GenerationGuard};
use crate::config::RankingConfig;
use crate::error::{FetchError, Result};
use crate::query::sorting::utils::dedup_by_key;
use crate::query::{BulkFetchCoordinator, PageView, RankedSequence, RankingEngine};
use crate::source::PagedSource;

/// Outcome of a page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Ready(PageView),
    /// A cycle for the current generation is already running. `stale` is the
    /// same page of the last good sequence, if there is one.
    Loading { stale: Option<PageView> },
    /// The cycle this request ran was invalidated while in flight and its
    /// result discarded. `generation` is the one now current.
    Superseded { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing ranked yet and nothing in flight.
    Idle,
    Loading,
    Ready,
    /// Only an older sequence is available.
    Stale,
}

/// Page of the last good sequence, marked with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StalePage {
    pub view: PageView,
    pub generation: u64,
    pub mode: SortMode,
}

#[derive(Debug, Clone)]
struct RankedSnapshot {
    generation: u64,
    sequence: Arc<RankedSequence>,
}

#[derive(Debug, Default)]
struct SessionState {
    filters: FilterSet,
    sort_mode: SortMode,
    held: Vec<Arc<Listing>>,
    held_total: Option<usize>,
    current: Option<RankedSnapshot>,
    last_good: Option<RankedSnapshot>,
    in_flight: Option<u64>,
}

impl SessionState {
    fn invalidate(&mut self) {
        self.current = None;
        self.held.clear();
        self.held_total = None;
    }
}

#[derive(Debug)]
pub struct CatalogSession<S> {
    coordinator: BulkFetchCoordinator<S>,
    engine: RankingEngine,
    generation: GenerationCounter,
    state: Mutex<SessionState>,
}

impl<S> CatalogSession<S>
where
    S: PagedSource,
{
    pub fn new(source: S, config: &RankingConfig) -> Self {
        Self {
            coordinator: BulkFetchCoordinator::from_config(source, config),
            engine: RankingEngine::new(config.page_size),
            generation: GenerationCounter::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn source(&self) -> &S {
        self.coordinator.source()
    }

    pub fn filters(&self) -> FilterSet {
        self.state.lock().filters.clone()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.state.lock().sort_mode
    }

    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn page_size(&self) -> usize {
        self.engine.page_size()
    }

    /// Replace the active filters. Returns the resulting generation.
    pub fn set_filter(&self, filters: FilterSet) -> u64 {
        let mut state = self.state.lock();
        if state.filters == filters {
            return self.generation.current();
        }

        state.filters = filters;
        state.invalidate();
        let generation = self.generation.advance();
        debug!(
            generation,
            filters = state.filters.fingerprint(),
            "filters changed"
        );
        generation
    }

    /// Switch the active sort mode. Returns the resulting generation.
    ///
    /// The filtered set does not change with the sort, so a complete ranked
    /// sequence is handed to the next cycle as held listings.
    pub fn set_sort_mode(&self, mode: SortMode) -> u64 {
        let mut state = self.state.lock();
        if state.sort_mode == mode {
            return self.generation.current();
        }

        let reusable = state.current.as_ref().map(|snapshot| {
            snapshot
                .sequence
                .iter()
                .map(|ranked| Arc::clone(&ranked.record))
                .collect::<Vec<_>>()
        });

        state.sort_mode = mode;
        state.invalidate();
        if let Some(records) = reusable {
            state.held_total = Some(records.len());
            state.held = records;
        }

        let generation = self.generation.advance();
        debug!(generation, sort = %mode, "sort mode changed");
        generation
    }

    /// Drop the ranked sequence for the current filters and sort, e.g. after
    /// the underlying data changed. Returns the new generation.
    pub fn invalidate(&self) -> u64 {
        let mut state = self.state.lock();
        state.invalidate();
        self.generation.advance()
    }

    /// Hand over listings the rendering layer already holds, with the total
    /// the source reported for them.
    ///
    /// `generation` is the one the records were fetched under. A seed from
    /// any other generation belongs to filters or a sort the user has left
    /// and is ignored. Returns whether the seed was taken.
    pub fn seed_visible(
        &self,
        generation: u64,
        mut records: Vec<Arc<Listing>>,
        total: usize,
    ) -> bool {
        let mut state = self.state.lock();
        let current = self.generation.current();
        if generation != current {
            debug!(seeded = generation, current, "seed from another generation ignored");
            return false;
        }
        if state.current.is_some() {
            debug!("ranked sequence present; seed ignored");
            return false;
        }
        let dropped = dedup_by_key(&mut records, |listing| listing.id.clone());
        if dropped > 0 {
            debug!(dropped, "duplicate seeded listings dropped");
        }
        state.held = records;
        state.held_total = Some(total);
        true
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.state.lock();
        if state.current.is_some() {
            SessionStatus::Ready
        } else if state.in_flight == Some(self.generation.current()) {
            SessionStatus::Loading
        } else if state.last_good.is_some() {
            SessionStatus::Stale
        } else {
            SessionStatus::Idle
        }
    }

    /// Ranked sequence for the current generation, if built.
    pub fn current_sequence(&self) -> Option<Arc<RankedSequence>> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|snapshot| Arc::clone(&snapshot.sequence))
    }

    /// Page `page_number` of the last good sequence.
    pub fn stale_page(&self, page_number: usize) -> Option<StalePage> {
        self.state.lock().last_good.as_ref().map(|snapshot| StalePage {
            view: snapshot.sequence.page(page_number),
            generation: snapshot.generation,
            mode: snapshot.sequence.mode(),
        })
    }

    /// Serve page `page_number` of the globally ranked set, building it
    /// first when the current generation has none.
    ///
    /// On failure the last good sequence is kept and stays reachable
    /// through [`stale_page`](Self::stale_page).
    pub async fn request_page(&self, page_number: usize) -> Result<PageState> {
        let (guard, filters, mode, held, held_total) = {
            let mut state = self.state.lock();
            if let Some(snapshot) = &state.current {
                return Ok(PageState::Ready(snapshot.sequence.page(page_number)));
            }

            let guard = self.generation.guard();
            if state.in_flight == Some(guard.generation()) {
                let stale = state
                    .last_good
                    .as_ref()
                    .map(|snapshot| snapshot.sequence.page(page_number));
                return Ok(PageState::Loading { stale });
            }

            state.in_flight = Some(guard.generation());
            (
                guard,
                state.filters.clone(),
                state.sort_mode,
                state.held.clone(),
                state.held_total,
            )
        };

        let fetched = match held_total {
            Some(total) => {
                self.coordinator
                    .ensure_full_set(&filters, held, total, mode, &guard)
                    .await
            }
            None => self.coordinator.fetch_all(&filters, mode, &guard).await,
        };

        self.complete_cycle(&guard, mode, page_number, fetched)
    }

    fn complete_cycle(
        &self,
        guard: &GenerationGuard,
        mode: SortMode,
        page_number: usize,
        fetched: std::result::Result<Vec<Arc<Listing>>, FetchError>,
    ) -> Result<PageState> {
        let generation = guard.generation();
        let mut state = self.state.lock();
        if state.in_flight == Some(generation) {
            state.in_flight = None;
        }

        if !guard.is_current() {
            return Ok(PageState::Superseded {
                generation: self.generation.current(),
            });
        }

        let records = match fetched {
            Ok(records) => records,
            Err(FetchError::Superseded { current }) => {
                return Ok(PageState::Superseded {
                    generation: current,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let sequence = Arc::new(self.engine.rank(records, mode));
        info!(
            generation,
            sort = %mode,
            total = sequence.total(),
            pages = sequence.total_pages(),
            "ranking cycle complete"
        );

        let snapshot = RankedSnapshot {
            generation,
            sequence: Arc::clone(&sequence),
        };
        state.current = Some(snapshot.clone());
        state.last_good = Some(snapshot);
        state.held.clear();
        state.held_total = None;

        Ok(PageState::Ready(sequence.page(page_number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::source::{FetchedPage, MemorySource};
    use async_trait::async_trait;
    use forecourt_model::ListingId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn listing(n: usize) -> Listing {
        Listing::new(ListingId::new(format!("car-{n:03}")).unwrap())
            .with_price(((n * 7919) % 50_000) as f64)
            .with_year(2000 + (n % 24) as i32)
            .with_make(if n % 2 == 0 { "Toyota" } else { "Honda" })
    }

    fn fleet(count: usize) -> MemorySource {
        MemorySource::new((0..count).map(listing))
    }

    fn config() -> RankingConfig {
        RankingConfig {
            page_size: 50,
            chunk_size: 200,
            ..RankingConfig::default()
        }
    }

    fn ready(state: PageState) -> PageView {
        match state {
            PageState::Ready(view) => view,
            other => panic!("expected a ready page, got {other:?}"),
        }
    }

    /// Blocks every fetch until released.
    struct GatedSource {
        inner: MemorySource,
        entered: Notify,
        release: Notify,
    }

    impl GatedSource {
        fn new(inner: MemorySource) -> Self {
            Self {
                inner,
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl PagedSource for GatedSource {
        async fn fetch_page(
            &self,
            filters: &FilterSet,
            page: usize,
            page_size: usize,
            sort: SortMode,
        ) -> anyhow::Result<FetchedPage> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.fetch_page(filters, page, page_size, sort).await
        }
    }

    /// Fails every fetch while `down` is set.
    struct FlakySource {
        inner: MemorySource,
        down: AtomicBool,
    }

    #[async_trait]
    impl PagedSource for FlakySource {
        async fn fetch_page(
            &self,
            filters: &FilterSet,
            page: usize,
            page_size: usize,
            sort: SortMode,
        ) -> anyhow::Result<FetchedPage> {
            if self.down.load(Ordering::SeqCst) {
                anyhow::bail!("connection reset");
            }
            self.inner.fetch_page(filters, page, page_size, sort).await
        }
    }

    #[tokio::test]
    async fn first_request_ranks_and_pages() {
        let session = CatalogSession::new(fleet(187), &config());
        assert_eq!(session.status(), SessionStatus::Idle);
        session.set_sort_mode(SortMode::PriceAsc);

        let view = ready(session.request_page(4).await.unwrap());
        assert_eq!(view.total, 187);
        assert_eq!(view.total_pages, 4);
        assert_eq!(view.items.len(), 37);
        assert_eq!(view.first_rank(), Some(151));
        assert!(!view.has_next);
        assert_eq!(session.status(), SessionStatus::Ready);

        let clamped = ready(session.request_page(9_999).await.unwrap());
        assert_eq!(clamped, view);
        assert_eq!(session.source().requests(), 1);
    }

    #[tokio::test]
    async fn identical_changes_are_no_ops() {
        let session = CatalogSession::new(fleet(10), &config());
        let generation = session.generation();

        assert_eq!(session.set_filter(FilterSet::new()), generation);
        assert_eq!(session.set_sort_mode(SortMode::default()), generation);

        let next = session.set_filter(FilterSet::new().with_make("Honda"));
        assert_eq!(next, generation + 1);
        assert_eq!(session.filters().make.as_deref(), Some("Honda"));
    }

    #[tokio::test]
    async fn sort_change_reranks_without_refetching() {
        let session = CatalogSession::new(fleet(120), &config());
        session.set_sort_mode(SortMode::PriceAsc);
        let cheapest = ready(session.request_page(1).await.unwrap());

        session.set_sort_mode(SortMode::PriceDesc);
        assert_eq!(session.status(), SessionStatus::Stale);
        let dearest = ready(session.request_page(1).await.unwrap());

        assert_eq!(session.source().requests(), 1);
        assert_eq!(dearest.total, 120);
        assert!(
            dearest.items[0].key.value() >= cheapest.items[0].key.value()
        );
        assert_eq!(session.sort_mode(), SortMode::PriceDesc);
    }

    #[tokio::test]
    async fn filter_change_refetches() {
        let session = CatalogSession::new(fleet(120), &config());
        ready(session.request_page(1).await.unwrap());

        session.set_filter(FilterSet::new().with_make("toyota"));
        let view = ready(session.request_page(1).await.unwrap());

        assert_eq!(view.total, 60);
        assert_eq!(session.source().requests(), 2);
    }

    #[tokio::test]
    async fn seeded_listings_join_the_cycle() {
        let session = CatalogSession::new(fleet(187), &config());
        let mut visible: Vec<_> = (0..50).map(|n| Arc::new(listing(n))).collect();
        visible.push(Arc::new(listing(7)));
        assert!(session.seed_visible(session.generation(), visible, 187));

        let view = ready(session.request_page(1).await.unwrap());
        assert_eq!(view.total, 187);
        let sequence = session.current_sequence().unwrap();
        assert_eq!(sequence.total(), 187);
    }

    #[tokio::test]
    async fn seed_from_a_left_filter_is_ignored() {
        let car = |id: &str, make: &str| {
            Listing::new(ListingId::new(id).unwrap())
                .with_make(make)
                .with_price(10_000.0)
        };
        let source = MemorySource::new([
            car("t1", "Toyota"),
            car("t2", "Toyota"),
            car("h1", "Honda"),
            car("h2", "Honda"),
            car("h3", "Honda"),
        ]);
        let session = CatalogSession::new(source, &config());

        let toyota = session.set_filter(FilterSet::new().with_make("Toyota"));
        session.set_filter(FilterSet::new().with_make("Honda"));
        let stale_seed = vec![
            Arc::new(car("t1", "Toyota")),
            Arc::new(car("t2", "Toyota")),
        ];
        assert!(!session.seed_visible(toyota, stale_seed, 2));

        let view = ready(session.request_page(1).await.unwrap());
        let ids: Vec<_> = view.items.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, ["h1", "h2", "h3"]);
        assert_eq!(session.source().requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timeout_fails_a_stalled_cycle() {
        let config = RankingConfig {
            fetch_timeout: Duration::from_secs(1),
            ..config()
        };
        let session = CatalogSession::new(GatedSource::new(fleet(10)), &config);

        let err = session.request_page(1).await.unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Fetch(FetchError::Timeout { page: 1, after })
                if after == Duration::from_secs(1)
        ));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.current_sequence().is_none());
    }

    #[tokio::test]
    async fn failure_keeps_last_good_sequence() {
        let source = FlakySource {
            inner: fleet(90),
            down: AtomicBool::new(false),
        };
        let session = CatalogSession::new(source, &config());
        session.set_sort_mode(SortMode::YearDesc);
        let good = ready(session.request_page(2).await.unwrap());

        session.set_filter(FilterSet::new().with_make("Honda"));
        session.source().down.store(true, Ordering::SeqCst);

        let err = session.request_page(1).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Fetch(FetchError::Source { page: 1, .. })
        ));
        assert_eq!(session.status(), SessionStatus::Stale);

        let stale = session.stale_page(2).unwrap();
        assert_eq!(stale.view, good);
        assert_eq!(stale.mode, SortMode::YearDesc);
        assert!(stale.generation < session.generation());

        session.source().down.store(false, Ordering::SeqCst);
        let view = ready(session.request_page(1).await.unwrap());
        assert_eq!(view.total, 45);
    }

    #[tokio::test]
    async fn concurrent_request_reports_loading() {
        let session = Arc::new(CatalogSession::new(
            GatedSource::new(fleet(40)),
            &config(),
        ));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.request_page(1).await }
        });
        session.source().entered.notified().await;

        let second = session.request_page(1).await.unwrap();
        assert_eq!(second, PageState::Loading { stale: None });
        assert_eq!(session.status(), SessionStatus::Loading);

        session.source().release.notify_one();
        let view = ready(first.await.unwrap().unwrap());
        assert_eq!(view.total, 40);
    }

    #[tokio::test]
    async fn change_during_fetch_supersedes_the_cycle() {
        let session = Arc::new(CatalogSession::new(
            GatedSource::new(fleet(40)),
            &config(),
        ));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.request_page(1).await }
        });
        session.source().entered.notified().await;

        let generation = session.set_sort_mode(SortMode::MileageAsc);
        session.source().release.notify_one();

        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, PageState::Superseded { generation });
        assert!(session.current_sequence().is_none());
        assert_eq!(session.status(), SessionStatus::Idle);

        session.source().release.notify_one();
        let view = ready(session.request_page(1).await.unwrap());
        assert_eq!(view.total, 40);
        assert_eq!(session.current_sequence().unwrap().mode(), SortMode::MileageAsc);
    }
}
