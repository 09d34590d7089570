//! Tests for the listing comparator

use crate::query::sorting::{ListingComparator, compare, extract_key};
use forecourt_model::{Listing, ListingId, SortMode};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::cmp::Ordering;

fn listing(id: &str) -> Listing {
    Listing::new(ListingId::new(id).unwrap())
}

/// A deliberately awkward set: duplicate keys, missing fields, string
/// mileages and timestamps in several shapes.
fn fixture() -> Vec<Listing> {
    vec![
        listing("B")
            .with_price(10_000.0)
            .with_year(2018)
            .with_mileage_km(50_000.0)
            .with_listed_at("2024-01-02T00:00:00Z"),
        listing("A")
            .with_price(10_000.0)
            .with_year(2018)
            .with_mileage_km(50_000.0)
            .with_listed_at("2024-01-02T00:00:00Z"),
        listing("C").with_current_bid(4_000.0).with_year(2009),
        listing("D").with_mileage_text("120,000 km").with_listed_at("garbage"),
        listing("E")
            .with_price(27_500.0)
            .with_year(2022)
            .with_listed_at_millis(1_700_000_000_000),
        listing("F"),
        listing("G").with_price(999.0).with_mileage_text("n/a"),
        listing("H")
            .with_price(10_000.0)
            .with_year(2020)
            .with_listed_at("2023-12-31"),
    ]
}

fn ids(items: &[Listing]) -> Vec<&str> {
    items.iter().map(|l| l.id.as_str()).collect()
}

#[test]
fn test_comparator_is_irreflexive_and_antisymmetric() {
    let items = fixture();
    for &mode in SortMode::all() {
        for a in &items {
            assert_eq!(compare(a, a, mode), Ordering::Equal, "{mode}");
            for b in &items {
                if a.id != b.id {
                    assert_ne!(compare(a, b, mode), Ordering::Equal, "{mode}");
                }
                assert_eq!(
                    compare(a, b, mode),
                    compare(b, a, mode).reverse(),
                    "{mode}: {} vs {}",
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[test]
fn test_comparator_is_transitive() {
    let items = fixture();
    for &mode in SortMode::all() {
        for a in &items {
            for b in &items {
                for c in &items {
                    if compare(a, b, mode) == Ordering::Less
                        && compare(b, c, mode) == Ordering::Less
                    {
                        assert_eq!(
                            compare(a, c, mode),
                            Ordering::Less,
                            "{mode}: {} < {} < {}",
                            a.id,
                            b.id,
                            c.id
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_every_permutation_sorts_identically() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for &mode in SortMode::all() {
        let mut reference = fixture();
        reference.sort_by(|a, b| compare(a, b, mode));
        let expected = ids(&reference).join(",");

        for _ in 0..50 {
            let mut shuffled = fixture();
            shuffled.shuffle(&mut rng);
            shuffled.sort_by(|a, b| compare(a, b, mode));
            assert_eq!(ids(&shuffled).join(","), expected, "{mode}");
        }
    }
}

#[test]
fn test_equal_keys_tie_break_on_id() {
    let a = listing("A").with_price(5_000.0);
    let b = listing("B").with_price(5_000.0);

    for mode in [SortMode::PriceAsc, SortMode::PriceDesc] {
        assert_eq!(compare(&a, &b, mode), Ordering::Less, "{mode}");
        assert_eq!(compare(&b, &a, mode), Ordering::Greater, "{mode}");
    }
}

#[test]
fn test_price_orders() {
    let mut items = fixture();
    items.sort_by(|a, b| compare(a, b, SortMode::PriceAsc));
    // G 999, C 4000 (bid), A/B/H 10000, E 27500, then D/F without price
    assert_eq!(ids(&items), ["G", "C", "A", "B", "H", "E", "D", "F"]);

    items.sort_by(|a, b| compare(a, b, SortMode::PriceDesc));
    // Missing prices stay at the tail under descending order too
    assert_eq!(ids(&items), ["E", "A", "B", "H", "C", "G", "D", "F"]);
}

#[test]
fn test_year_orders_put_missing_at_the_old_end() {
    let mut items = fixture();
    items.sort_by(|a, b| compare(a, b, SortMode::YearDesc));
    assert_eq!(ids(&items), ["E", "H", "A", "B", "C", "D", "F", "G"]);

    items.sort_by(|a, b| compare(a, b, SortMode::YearAsc));
    assert_eq!(ids(&items), ["D", "F", "G", "C", "A", "B", "H", "E"]);
}

#[test]
fn test_mileage_orders() {
    let mut items = fixture();
    items.sort_by(|a, b| compare(a, b, SortMode::MileageAsc));
    assert_eq!(ids(&items), ["A", "B", "D", "C", "E", "F", "G", "H"]);

    items.sort_by(|a, b| compare(a, b, SortMode::MileageDesc));
    assert_eq!(ids(&items), ["D", "A", "B", "C", "E", "F", "G", "H"]);
}

#[test]
fn test_recency_orders() {
    let mut items = fixture();
    items.sort_by(|a, b| compare(a, b, SortMode::RecencyDesc));
    // A/B 2024-01-02, H 2023-12-31, E 2023-11-14, then undated (oldest)
    assert_eq!(ids(&items), ["A", "B", "H", "E", "C", "D", "F", "G"]);
}

#[test]
fn test_bound_comparator_matches_free_function() {
    let items = fixture();
    let comparator = ListingComparator::new(SortMode::MileageDesc);
    assert_eq!(comparator.mode(), SortMode::MileageDesc);
    for a in &items {
        for b in &items {
            assert_eq!(
                comparator.compare(a, b),
                compare(a, b, SortMode::MileageDesc)
            );
        }
    }
    assert_eq!(comparator.compare(&items[3], &items[0]), Ordering::Less);
    assert!(extract_key(&items[3], SortMode::MileageDesc).value() > 100_000.0);
}
