//! Core traits for sortable listing keys
//!
//! Every sort field knows how to pull its key out of a [`Listing`], and every
//! key knows how to compare itself in either direction while keeping its
//! missing-data policy intact.

use forecourt_model::Listing;
use std::cmp::Ordering;

/// Individual sort field with associated key type
///
/// Each field marker type implements this trait to specify its comparison
/// key type and how that key is extracted.
pub trait SortFieldMarker: Copy + Clone + Send + Sync + 'static {
    /// The type of key extracted for this field
    type Key: SortKey;

    /// Unique identifier for this field, used in log fields
    const ID: &'static str;

    /// Extract the key from a listing. Never fails: unusable data yields
    /// [`SortKey::missing`].
    fn extract(&self, listing: &Listing) -> Self::Key;
}

/// Keys that can be compared for sorting
///
/// All sort keys must be comparable and handle missing data gracefully.
pub trait SortKey: Ord + Clone + Send + Sync {
    /// Create a key representing missing/null data
    fn missing() -> Self;

    /// Check if this key represents missing data
    fn is_missing(&self) -> bool;

    /// Primitive value of the key, with the documented sentinel when missing
    fn value(&self) -> f64;

    /// Compare two keys in the requested direction
    #[inline]
    fn compare_with_order(&self, other: &Self, reverse: bool) -> Ordering {
        if reverse {
            other.cmp(self)
        } else {
            self.cmp(other)
        }
    }
}
