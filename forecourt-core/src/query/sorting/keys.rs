//! Sort key types for comparing listings
//!
//! These types wrap the values extracted from listings and encode the
//! missing-data policy of their field in their `Ord` and
//! [`SortKey::compare_with_order`] implementations.

use super::traits::SortKey;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// Sentinel reported for a missing price or mileage: 2^53 - 1, the largest
/// integer an IEEE double (and a JavaScript client) represents exactly.
pub const MISSING_AMOUNT: f64 = 9_007_199_254_740_991.0;

/// Sentinel reported for a missing year or timestamp.
pub const MISSING_TIMELINE: f64 = f64::NEG_INFINITY;

/// Amount key for prices and distances.
///
/// Missing amounts sort last in both directions, so a listing with no usable
/// price never heads a `price_desc` page.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct AmountKey(Option<OrderedFloat<f64>>);

impl AmountKey {
    /// Non-finite and negative values are treated as missing.
    pub fn new(value: Option<f64>) -> Self {
        AmountKey(
            value
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(OrderedFloat),
        )
    }
}

impl Ord for AmountKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less, // Items with values come first
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for AmountKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl SortKey for AmountKey {
    fn missing() -> Self {
        AmountKey(None)
    }

    fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    fn value(&self) -> f64 {
        self.0.map(|v| v.into_inner()).unwrap_or(MISSING_AMOUNT)
    }

    fn compare_with_order(&self, other: &Self, reverse: bool) -> Ordering {
        match (self.0.is_none(), other.0.is_none()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                if reverse {
                    other.cmp(self)
                } else {
                    self.cmp(other)
                }
            }
        }
    }
}

/// Timeline key for model years and listing timestamps (epoch millis).
///
/// Missing values are the oldest possible point in time: first under an
/// ascending sort, last under a descending one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TimelineKey(Option<OrderedFloat<f64>>);

impl TimelineKey {
    pub fn new(value: Option<f64>) -> Self {
        TimelineKey(value.filter(|v| v.is_finite()).map(OrderedFloat))
    }
}

impl Ord for TimelineKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Greater, // Missing is oldest
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for TimelineKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl SortKey for TimelineKey {
    fn missing() -> Self {
        TimelineKey(None)
    }

    fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    fn value(&self) -> f64 {
        self.0.map(|v| v.into_inner()).unwrap_or(MISSING_TIMELINE)
    }
}

/// Runtime key for whichever field the active sort mode selects.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RankKey {
    Amount(AmountKey),
    Timeline(TimelineKey),
}

impl RankKey {
    pub fn is_missing(&self) -> bool {
        match self {
            RankKey::Amount(key) => key.is_missing(),
            RankKey::Timeline(key) => key.is_missing(),
        }
    }

    /// Primitive value, sentinel included.
    pub fn value(&self) -> f64 {
        match self {
            RankKey::Amount(key) => key.value(),
            RankKey::Timeline(key) => key.value(),
        }
    }

    pub fn compare_with_order(&self, other: &Self, reverse: bool) -> Ordering {
        match (self, other) {
            (RankKey::Amount(a), RankKey::Amount(b)) => {
                a.compare_with_order(b, reverse)
            }
            (RankKey::Timeline(a), RankKey::Timeline(b)) => {
                a.compare_with_order(b, reverse)
            }
            // A single mode never mixes key kinds; keep the order total anyway.
            (RankKey::Amount(_), RankKey::Timeline(_)) => Ordering::Less,
            (RankKey::Timeline(_), RankKey::Amount(_)) => Ordering::Greater,
        }
    }
}

impl From<AmountKey> for RankKey {
    fn from(key: AmountKey) -> Self {
        RankKey::Amount(key)
    }
}

impl From<TimelineKey> for RankKey {
    fn from(key: TimelineKey) -> Self {
        RankKey::Timeline(key)
    }
}
