//! Total-order comparator over listings
//!
//! Keys are compared in the mode's direction; equal keys fall back to the
//! listing id in ascending lexicographic order, whatever the direction. The
//! id is unique, so no two distinct listings ever compare equal and every
//! permutation of the same input sorts to the same sequence.

use forecourt_model::{Listing, ListingId, SortMode};
use std::cmp::Ordering;

use super::extract::extract_key;
use super::keys::RankKey;

/// Compare two listings under `mode`.
pub fn compare(a: &Listing, b: &Listing, mode: SortMode) -> Ordering {
    compare_keyed(
        (&extract_key(a, mode), &a.id),
        (&extract_key(b, mode), &b.id),
        mode,
    )
}

/// Compare pre-extracted keys. Used by the ranking engine, which decorates
/// each listing with its key once instead of re-extracting per comparison.
#[inline]
pub fn compare_keyed(
    (key_a, id_a): (&RankKey, &ListingId),
    (key_b, id_b): (&RankKey, &ListingId),
    mode: SortMode,
) -> Ordering {
    key_a
        .compare_with_order(key_b, mode.order().is_reverse())
        .then_with(|| id_a.cmp(id_b))
}

/// Comparator bound to one sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingComparator {
    mode: SortMode,
}

impl ListingComparator {
    pub fn new(mode: SortMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        compare(a, b, self.mode)
    }
}
