use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Constraints narrowing the listing population.
///
/// The ranking engine never interprets a filter set; it only forwards it to
/// the paged source and compares it for change detection.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterSet {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_range: Option<(i32, i32)>,
    pub price_range: Option<(f64, f64)>,
    pub max_mileage_km: Option<f64>,
    /// Source-specific constraints passed through verbatim.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra: BTreeMap<String, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_year_range(mut self, from: i32, to: i32) -> Self {
        self.year_range = Some((from, to));
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some((min, max));
        self
    }

    pub fn with_max_mileage_km(mut self, km: f64) -> Self {
        self.max_mileage_km = Some(km);
        self
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterSet::default()
    }

    /// Hash of the constraints for log fields and in-process cache keys.
    ///
    /// Equal filter sets hash equally within one build. The value is not
    /// guaranteed across Rust releases and must not be persisted.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.make.hash(&mut hasher);
        self.model.hash(&mut hasher);
        self.year_range.hash(&mut hasher);
        self.price_range
            .map(|(min, max)| (min.to_bits(), max.to_bits()))
            .hash(&mut hasher);
        self.max_mileage_km.map(f64::to_bits).hash(&mut hasher);
        self.extra.hash(&mut hasher);
        hasher.finish()
    }
}
