//! Helpers shared by ranking and the catalog session

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first occurrence of every key, preserving order.
///
/// Returns how many items were dropped.
pub fn dedup_by_key<T, K, F>(items: &mut Vec<T>, mut key: F) -> usize
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    items.retain(|item| seen.insert(key(item)));
    before - items.len()
}
