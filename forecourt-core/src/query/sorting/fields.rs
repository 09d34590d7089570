//! Field marker types for compile-time safe sorting
//!
//! These zero-sized types represent the listing attributes a sort mode can
//! order by. Each marker owns the fallback chain for its key.

use forecourt_model::Listing;

use super::extract::{parse_amount, parse_timestamp_millis};
use super::keys::{AmountKey, TimelineKey};
use super::traits::{SortFieldMarker, SortKey};

/// Sort by price: listed price, else current bid, else missing.
#[derive(Copy, Clone, Debug)]
pub struct PriceField;

impl SortFieldMarker for PriceField {
    type Key = AmountKey;
    const ID: &'static str = "price";

    fn extract(&self, listing: &Listing) -> AmountKey {
        [&listing.listed_price, &listing.current_bid]
            .into_iter()
            .flatten()
            .map(|raw| AmountKey::new(parse_amount(raw)))
            .find(|key| !key.is_missing())
            .unwrap_or_else(AmountKey::missing)
    }
}

/// Sort by model year. No fallback.
#[derive(Copy, Clone, Debug)]
pub struct YearField;

impl SortFieldMarker for YearField {
    type Key = TimelineKey;
    const ID: &'static str = "year";

    fn extract(&self, listing: &Listing) -> TimelineKey {
        TimelineKey::new(listing.model_year.map(f64::from))
    }
}

/// Sort by odometer reading in kilometres.
#[derive(Copy, Clone, Debug)]
pub struct MileageField;

impl SortFieldMarker for MileageField {
    type Key = AmountKey;
    const ID: &'static str = "mileage";

    fn extract(&self, listing: &Listing) -> AmountKey {
        AmountKey::new(listing.mileage_km.as_ref().and_then(parse_amount))
    }
}

/// Sort by listing or sale timestamp.
#[derive(Copy, Clone, Debug)]
pub struct RecencyField;

impl SortFieldMarker for RecencyField {
    type Key = TimelineKey;
    const ID: &'static str = "recency";

    fn extract(&self, listing: &Listing) -> TimelineKey {
        TimelineKey::new(
            listing
                .listed_at
                .as_ref()
                .and_then(parse_timestamp_millis)
                .map(|millis| millis as f64),
        )
    }
}
