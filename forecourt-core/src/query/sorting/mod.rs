//! Sorting module for global listing ranking
//!
//! This module provides:
//! - Core traits for sort keys and field markers
//! - Missing-data aware key types
//! - Key extraction with documented fallback chains
//! - The total-order listing comparator

pub mod comparator;
pub mod extract;
pub mod fields;
pub mod keys;
pub mod traits;
pub mod utils;

#[cfg(test)]
mod tests;

pub use comparator::*;
pub use extract::*;
pub use fields::*;
pub use keys::*;
pub use traits::*;
