//! In-memory reference source.
//!
//! Serves pages in insertion order and ignores the requested sort mode, the
//! way an upstream that cannot sort globally behaves. Mutations between page
//! fetches are visible to later pages, which makes it useful for exercising
//! drift and overlap handling.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use async_trait::async_trait;
use forecourt_model::{FilterSet, Listing, ListingId, SortMode};
use parking_lot::RwLock;

use super::{FetchedPage, PagedSource};
use crate::query::sorting::{PriceField, SortFieldMarker, SortKey, parse_amount};

#[derive(Debug, Default)]
pub struct MemorySource {
    listings: RwLock<Vec<Arc<Listing>>>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new(listings: impl IntoIterator<Item = Listing>) -> Self {
        Self {
            listings: RwLock::new(listings.into_iter().map(Arc::new).collect()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.read().is_empty()
    }

    pub fn insert(&self, listing: Listing) {
        self.listings.write().push(Arc::new(listing));
    }

    /// Insert at a position, shifting later listings onto later pages.
    pub fn insert_at(&self, index: usize, listing: Listing) {
        let mut listings = self.listings.write();
        let index = index.min(listings.len());
        listings.insert(index, Arc::new(listing));
    }

    pub fn remove(&self, id: &ListingId) -> bool {
        let mut listings = self.listings.write();
        let before = listings.len();
        listings.retain(|listing| &listing.id != id);
        listings.len() != before
    }

    /// Number of `fetch_page` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn matching(&self, filters: &FilterSet) -> Vec<Arc<Listing>> {
        self.listings
            .read()
            .iter()
            .filter(|listing| matches_filters(listing, filters))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PagedSource for MemorySource {
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        page: usize,
        page_size: usize,
        _sort: SortMode,
    ) -> anyhow::Result<FetchedPage> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if page == 0 {
            bail!("page numbers start at 1");
        }
        if page_size == 0 {
            bail!("page size must be at least 1");
        }

        let matching = self.matching(filters);
        let total = matching.len();
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);

        Ok(FetchedPage {
            items: matching[start..end].to_vec(),
            total,
        })
    }
}

/// Reference interpretation of a filter set. Text matches are
/// case-insensitive; a listing lacking a constrained attribute never matches.
/// `extra` constraints are source-specific and ignored here.
pub fn matches_filters(listing: &Listing, filters: &FilterSet) -> bool {
    fn text_matches(value: Option<&str>, wanted: Option<&str>) -> bool {
        match wanted {
            None => true,
            Some(wanted) => {
                value.is_some_and(|v| v.trim().eq_ignore_ascii_case(wanted.trim()))
            }
        }
    }

    if !text_matches(listing.make.as_deref(), filters.make.as_deref())
        || !text_matches(listing.model.as_deref(), filters.model.as_deref())
    {
        return false;
    }

    if let Some((from, to)) = filters.year_range {
        match listing.model_year {
            Some(year) if (from..=to).contains(&year) => {}
            _ => return false,
        }
    }

    if let Some((min, max)) = filters.price_range {
        let price = PriceField.extract(listing);
        if price.is_missing() || price.value() < min || price.value() > max {
            return false;
        }
    }

    if let Some(limit) = filters.max_mileage_km {
        match listing.mileage_km.as_ref().and_then(parse_amount) {
            Some(km) if km <= limit => {}
            _ => return false,
        }
    }

    true
}
