//! Read-only page projection over a ranked sequence
//!
//! Out-of-range page numbers are clamped into `[1, max(total_pages, 1)]`
//! rather than rejected: asking for page 9999 of a four-page set returns
//! page four. Every call recomputes from the sequence it is given.

use super::ranking::{RankedRecord, RankedSequence};

/// One page of a ranked sequence plus navigation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub items: Vec<RankedRecord>,
    /// The page actually served, after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rank of the first item on the page, if any.
    pub fn first_rank(&self) -> Option<usize> {
        self.items.first().map(|r| r.rank)
    }
}

/// Stateless page slicer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagingView;

impl PagingView {
    /// `ceil(total / page_size)`, with a zero page size treated as one.
    pub fn total_pages(total: usize, page_size: usize) -> usize {
        total.div_ceil(page_size.max(1))
    }

    /// Clamp a requested page number into the valid range.
    pub fn clamp_page(page_number: usize, total_pages: usize) -> usize {
        page_number.clamp(1, total_pages.max(1))
    }

    /// Slice `sequence` at `page_number` (1-based).
    pub fn get_page(
        sequence: &RankedSequence,
        page_number: usize,
        page_size: usize,
    ) -> PageView {
        let page_size = page_size.max(1);
        let total = sequence.total();
        let total_pages = Self::total_pages(total, page_size);
        let page = Self::clamp_page(page_number, total_pages);

        let start = ((page - 1) * page_size).min(total);
        let end = (start + page_size).min(total);

        PageView {
            items: sequence.records()[start..end].to_vec(),
            page,
            page_size,
            total_pages,
            total,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }
}
