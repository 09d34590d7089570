//! Sort key extraction
//!
//! Maps a listing and a sort mode to a comparable [`RankKey`]. Extraction is
//! total: anything unparsable degrades to the field's missing sentinel and is
//! only reported at `trace` level.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use forecourt_model::listing::epoch_millis;
use forecourt_model::{Listing, RawNumber, RawTimestamp, SortField, SortMode};
use tracing::trace;

use super::fields::{MileageField, PriceField, RecencyField, YearField};
use super::keys::RankKey;
use super::traits::{SortFieldMarker, SortKey};

const CURRENCY_PREFIXES: &[char] = &['$', '€', '£', '¥'];
const DIGIT_SEPARATORS: &[char] = &[',', '_', ' ', '\u{a0}', '\''];

/// Extract the key the given mode orders by.
pub fn extract_key(listing: &Listing, mode: SortMode) -> RankKey {
    match mode.field() {
        SortField::Price => keyed(PriceField, listing),
        SortField::Year => keyed(YearField, listing),
        SortField::Mileage => keyed(MileageField, listing),
        SortField::Recency => keyed(RecencyField, listing),
    }
}

fn keyed<F>(field: F, listing: &Listing) -> RankKey
where
    F: SortFieldMarker,
    F::Key: Into<RankKey>,
{
    let key = field.extract(listing);
    if key.is_missing() {
        trace!(
            listing_id = %listing.id,
            field = F::ID,
            sentinel = key.value(),
            "sort key degraded to sentinel"
        );
    }
    key.into()
}

/// Interpret a raw amount (price, bid, distance).
///
/// Text may carry a leading currency symbol, thousands separators
/// (`,` `_` space, apostrophe) and trailing unit text such as `km`. A comma is
/// always a thousands separator, never a decimal mark.
pub fn parse_amount(raw: &RawNumber) -> Option<f64> {
    match raw {
        RawNumber::Number(value) => Some(*value),
        RawNumber::Text(text) => parse_amount_text(text),
    }
}

fn parse_amount_text(text: &str) -> Option<f64> {
    let body = text
        .trim()
        .trim_start_matches(|c: char| CURRENCY_PREFIXES.contains(&c))
        .trim_start();

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        if c.is_ascii_digit() || c == '.' {
            digits.push(c);
        } else if DIGIT_SEPARATORS.contains(&c) {
            continue;
        } else {
            // Unit suffix or garbage; whatever was read so far stands.
            break;
        }
    }

    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// Interpret a raw listing timestamp as epoch milliseconds (UTC).
pub fn parse_timestamp_millis(raw: &RawTimestamp) -> Option<i64> {
    match raw {
        RawTimestamp::EpochMillis(millis) => Some(*millis),
        RawTimestamp::Text(text) => parse_timestamp_text(text.trim()),
    }
}

fn parse_timestamp_text(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok().map(epoch_millis);
    }

    None
}
