//! Vehicle listings as delivered by the upstream auction source.
//!
//! A [`Listing`] keeps the full JSON payload untouched and lifts only the
//! fields ranking needs into typed optional slots. The lifting happens once,
//! in [`Listing::from_payload`], so nothing downstream inspects JSON.

use serde_json::{Map, Number, Value};

use crate::error::ModelError;
use crate::ids::ListingId;

const ID_FIELDS: &[&str] = &["id", "lot_id", "lot_number"];
const LISTED_PRICE_FIELDS: &[&str] = &["price", "buy_now_price", "listed_price"];
const CURRENT_BID_FIELDS: &[&str] = &["current_bid", "bid"];
const YEAR_FIELDS: &[&str] = &["year", "model_year"];
const MILEAGE_FIELDS: &[&str] = &["mileage_km", "odometer_km", "mileage"];
const TIMESTAMP_FIELDS: &[&str] = &["listed_at", "sale_date", "created_at"];
const MAKE_FIELDS: &[&str] = &["make", "manufacturer"];
const MODEL_FIELDS: &[&str] = &["model"];

/// A numeric field as the source sent it.
///
/// Upstream feeds are inconsistent about quoting numbers, so text is kept
/// verbatim and only interpreted when a sort key is extracted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

/// A timestamp field as the source sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawTimestamp {
    EpochMillis(i64),
    Text(String),
}

/// One vehicle listing. Immutable for the lifetime of a ranking cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Listing {
    pub id: ListingId,
    pub listed_price: Option<RawNumber>,
    pub current_bid: Option<RawNumber>,
    pub model_year: Option<i32>,
    pub mileage_km: Option<RawNumber>,
    pub listed_at: Option<RawTimestamp>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// Original payload, passed through to the rendering layer.
    pub payload: Value,
}

impl Listing {
    /// Bare listing with only an id; used by sources that build records in
    /// code rather than from a feed.
    pub fn new(id: ListingId) -> Self {
        Self {
            id,
            listed_price: None,
            current_bid: None,
            model_year: None,
            mileage_km: None,
            listed_at: None,
            make: None,
            model: None,
            payload: Value::Null,
        }
    }

    /// Map a raw source payload into a listing.
    pub fn from_payload(payload: Value) -> Result<Self, ModelError> {
        let object = match &payload {
            Value::Object(map) => map,
            other => {
                return Err(ModelError::InvalidPayload(format!(
                    "expected an object, got {}",
                    json_kind(other)
                )));
            }
        };

        let id = first_present(object, ID_FIELDS)
            .and_then(id_text)
            .ok_or(ModelError::MissingId)?;
        let id = ListingId::new(id)?;

        Ok(Self {
            id,
            listed_price: first_present(object, LISTED_PRICE_FIELDS)
                .and_then(raw_number),
            current_bid: first_present(object, CURRENT_BID_FIELDS)
                .and_then(raw_number),
            model_year: first_present(object, YEAR_FIELDS).and_then(year),
            mileage_km: first_present(object, MILEAGE_FIELDS)
                .and_then(raw_number),
            listed_at: first_present(object, TIMESTAMP_FIELDS)
                .and_then(raw_timestamp),
            make: first_present(object, MAKE_FIELDS).and_then(text),
            model: first_present(object, MODEL_FIELDS).and_then(text),
            payload,
        })
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.listed_price = Some(RawNumber::Number(price));
        self
    }

    pub fn with_current_bid(mut self, bid: f64) -> Self {
        self.current_bid = Some(RawNumber::Number(bid));
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.model_year = Some(year);
        self
    }

    pub fn with_mileage_km(mut self, km: f64) -> Self {
        self.mileage_km = Some(RawNumber::Number(km));
        self
    }

    pub fn with_mileage_text(mut self, raw: impl Into<String>) -> Self {
        self.mileage_km = Some(RawNumber::Text(raw.into()));
        self
    }

    pub fn with_listed_at(mut self, raw: impl Into<String>) -> Self {
        self.listed_at = Some(RawTimestamp::Text(raw.into()));
        self
    }

    pub fn with_listed_at_millis(mut self, millis: i64) -> Self {
        self.listed_at = Some(RawTimestamp::EpochMillis(millis));
        self
    }

    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

fn first_present<'a>(
    object: &'a Map<String, Value>,
    names: &[&str],
) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !value.is_null())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_number(value: &Value) -> Option<RawNumber> {
    match value {
        Value::Number(n) => n.as_f64().map(RawNumber::Number),
        Value::String(s) if !s.trim().is_empty() => {
            Some(RawNumber::Text(s.clone()))
        }
        _ => None,
    }
}

/// Epoch values whose magnitude is below this are read as seconds.
const EPOCH_SECONDS_LIMIT: i64 = 10_000_000_000;

/// Normalise an epoch value of unknown unit to milliseconds. Ten digits or
/// fewer means seconds.
pub fn epoch_millis(value: i64) -> i64 {
    if value.unsigned_abs() < EPOCH_SECONDS_LIMIT as u64 {
        value.saturating_mul(1_000)
    } else {
        value
    }
}

/// Integer value of a JSON number, accepting floats with no fractional part.
fn whole_number(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn raw_timestamp(value: &Value) -> Option<RawTimestamp> {
    match value {
        Value::Number(n) => {
            whole_number(n).map(|v| RawTimestamp::EpochMillis(epoch_millis(v)))
        }
        Value::String(s) if !s.trim().is_empty() => {
            Some(RawTimestamp::Text(s.clone()))
        }
        _ => None,
    }
}

fn year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => whole_number(n).and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
