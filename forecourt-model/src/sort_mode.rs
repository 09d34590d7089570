use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Listing attribute a sort mode orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortField {
    Price,
    Year,
    Mileage,
    Recency,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Year => "year",
            SortField::Mileage => "mileage",
            SortField::Recency => "recency",
        }
    }
}

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_reverse(&self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// The user-selected ordering criterion. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortMode {
    PriceAsc,
    PriceDesc,
    YearDesc,
    YearAsc,
    MileageAsc,
    MileageDesc,
    #[default]
    RecencyDesc,
    RecencyAsc,
}

impl SortMode {
    pub fn all() -> &'static [SortMode] {
        use SortMode::*;
        &[
            PriceAsc,
            PriceDesc,
            YearDesc,
            YearAsc,
            MileageAsc,
            MileageDesc,
            RecencyDesc,
            RecencyAsc,
        ]
    }

    pub fn field(&self) -> SortField {
        match self {
            SortMode::PriceAsc | SortMode::PriceDesc => SortField::Price,
            SortMode::YearAsc | SortMode::YearDesc => SortField::Year,
            SortMode::MileageAsc | SortMode::MileageDesc => SortField::Mileage,
            SortMode::RecencyAsc | SortMode::RecencyDesc => SortField::Recency,
        }
    }

    pub fn order(&self) -> SortOrder {
        match self {
            SortMode::PriceAsc
            | SortMode::YearAsc
            | SortMode::MileageAsc
            | SortMode::RecencyAsc => SortOrder::Ascending,
            SortMode::PriceDesc
            | SortMode::YearDesc
            | SortMode::MileageDesc
            | SortMode::RecencyDesc => SortOrder::Descending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::PriceAsc => "price_asc",
            SortMode::PriceDesc => "price_desc",
            SortMode::YearDesc => "year_desc",
            SortMode::YearAsc => "year_asc",
            SortMode::MileageAsc => "mileage_asc",
            SortMode::MileageDesc => "mileage_desc",
            SortMode::RecencyDesc => "recency_desc",
            SortMode::RecencyAsc => "recency_asc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownSortMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_mode_from_its_own_name() {
        for mode in SortMode::all() {
            assert_eq!(mode.as_str().parse::<SortMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" Price_ASC ".parse::<SortMode>(), Ok(SortMode::PriceAsc));
    }

    #[test]
    fn unknown_mode_is_an_error() {
        assert_eq!(
            "cheapest".parse::<SortMode>(),
            Err(ModelError::UnknownSortMode("cheapest".into()))
        );
    }

    #[test]
    fn modes_decompose_into_field_and_order() {
        assert_eq!(SortMode::MileageDesc.field(), SortField::Mileage);
        assert!(SortMode::MileageDesc.order().is_reverse());
        assert_eq!(SortMode::YearAsc.order(), SortOrder::Ascending);
        assert_eq!(SortMode::default(), SortMode::RecencyDesc);
    }
}
