//! Global ranking of a complete filtered listing set
//!
//! The engine sorts once per cycle and numbers the result densely from 1.
//! Ranks are positions: `records[i].rank == i + 1` always holds.

use std::cmp::Ordering;
use std::sync::Arc;

use forecourt_model::{Listing, SortMode};
use tracing::debug;

use super::paging::{PageView, PagingView};
use super::sorting::{RankKey, compare_keyed, extract_key};

/// A listing together with its global position.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: Arc<Listing>,
    /// 1-based, dense and unique within one sequence.
    pub rank: usize,
    /// Key the record was ranked by, sentinel included.
    pub key: RankKey,
}

/// The complete ordered result for one (filter, sort mode) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSequence {
    records: Vec<RankedRecord>,
    mode: SortMode,
    page_size: usize,
}

impl RankedSequence {
    pub fn records(&self) -> &[RankedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedRecord> {
        self.records.iter()
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        PagingView::total_pages(self.total(), self.page_size)
    }

    /// Record holding the given 1-based rank.
    pub fn by_rank(&self, rank: usize) -> Option<&RankedRecord> {
        rank.checked_sub(1).and_then(|idx| self.records.get(idx))
    }

    /// Page of this sequence at its own page size.
    pub fn page(&self, page_number: usize) -> PageView {
        PagingView::get_page(self, page_number, self.page_size)
    }
}

impl<'a> IntoIterator for &'a RankedSequence {
    type Item = &'a RankedRecord;
    type IntoIter = std::slice::Iter<'a, RankedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Sorts a listing set and assigns global ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingEngine {
    page_size: usize,
}

impl RankingEngine {
    /// A page size of zero is raised to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rank `records` under `mode`.
    ///
    /// Keys are extracted once per record, then a stable sort orders the
    /// decorated records with the listing comparator. Equal keys are resolved
    /// only by the comparator's id tie-break.
    pub fn rank(
        &self,
        records: Vec<Arc<Listing>>,
        mode: SortMode,
    ) -> RankedSequence {
        let mut decorated: Vec<(RankKey, Arc<Listing>)> = records
            .into_iter()
            .map(|record| (extract_key(&record, mode), record))
            .collect();

        decorated.sort_by(|(key_a, a), (key_b, b)| {
            compare_keyed((key_a, &a.id), (key_b, &b.id), mode)
        });

        debug_assert!(decorated.is_sorted_by(|(ka, a), (kb, b)| {
            compare_keyed((ka, &a.id), (kb, &b.id), mode) == Ordering::Less
        }));

        let records: Vec<RankedRecord> = decorated
            .into_iter()
            .enumerate()
            .map(|(idx, (key, record))| RankedRecord {
                record,
                rank: idx + 1,
                key,
            })
            .collect();

        debug!(
            mode = %mode,
            total = records.len(),
            page_size = self.page_size,
            "ranked listing set"
        );

        RankedSequence {
            records,
            mode,
            page_size: self.page_size,
        }
    }
}
