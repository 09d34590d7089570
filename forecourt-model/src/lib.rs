//! Core data model definitions shared across Forecourt crates.
#![allow(missing_docs)]

pub mod error;
pub mod filter;
pub mod ids;
pub mod listing;
pub mod sort_mode;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use filter::FilterSet;
pub use ids::ListingId;
pub use listing::{Listing, RawNumber, RawTimestamp};
pub use sort_mode::{SortField, SortMode, SortOrder};
