//! Seeded property suite for the quota selector: random days and quotas,
//! checked against the selection invariants.
//! Run with: cargo test --test selection_properties

use history_quota::ingest::types::RawRecord;
use history_quota::relevance::{RelevanceEngine, ScoredRecord};
use history_quota::config::terms::TermsConfig;
use history_quota::selection::{select, select_with, SelectionQuery, SelectionStrategy};
use rand::{rngs::StdRng, Rng, SeedableRng};

const CASES: usize = 400;

fn random_day(rng: &mut StdRng) -> Vec<ScoredRecord> {
    let n = rng.random_range(0..40);
    (0..n)
        .map(|i| {
            let is_regional = rng.random_bool(0.35);
            let base = if is_regional { 50.0 } else { 0.0 };
            // small score alphabet → plenty of exact ties
            let score = base + f64::from(rng.random_range(0..6u8)) * 1.5;
            // occasional duplicate (title, description)
            let key = if rng.random_bool(0.15) { 0 } else { i };
            ScoredRecord {
                record: RawRecord::new(
                    format!("t{key}"),
                    format!("d{key}"),
                    format!("https://example.org/{i}"),
                ),
                score,
                is_regional,
            }
        })
        .collect()
}

fn random_query(rng: &mut StdRng) -> SelectionQuery {
    let min = rng.random_range(0..15);
    let max = min + rng.random_range(0..15);
    let a: f64 = rng.random();
    let b: f64 = rng.random();
    SelectionQuery {
        min_count: min,
        max_count: max,
        regional_low: a.min(b),
        regional_high: a.max(b),
    }
}

fn unique_count(recs: &[ScoredRecord]) -> (usize, usize) {
    let mut seen = std::collections::HashSet::new();
    let (mut regional, mut global) = (0, 0);
    for r in recs {
        if seen.insert((r.title().to_string(), r.description().to_string())) {
            if r.is_regional {
                regional += 1;
            } else {
                global += 1;
            }
        }
    }
    (regional, global)
}

fn check_invariants(recs: &[ScoredRecord], q: &SelectionQuery, out: &[ScoredRecord]) {
    let (regional_avail, global_avail) = unique_count(recs);
    let total = q.total_for(regional_avail + global_avail);
    let (low, high) = q.regional_targets(total);
    let regional_out = out.iter().filter(|r| r.is_regional).count();

    // bounded by total, never contains duplicates
    assert!(out.len() <= total);
    assert_eq!(unique_count(out), (regional_out, out.len() - regional_out));

    // ordering: all regional first, score non-increasing within class
    let first_global = out.iter().position(|r| !r.is_regional).unwrap_or(out.len());
    assert!(out[first_global..].iter().all(|r| !r.is_regional));
    assert!(out
        .windows(2)
        .filter(|w| w[0].is_regional == w[1].is_regional)
        .all(|w| w[0].score >= w[1].score));

    // ratio bound whenever enough regional candidates exist
    if regional_avail >= low && low <= high {
        assert!(
            regional_out >= low.min(out.len()),
            "regional {regional_out} < low {low} (avail {regional_avail})"
        );
        assert!(regional_out <= high.max(low), "regional {regional_out} > high {high}");
    }

    // no regional candidates → purely global, as many as fit
    if regional_avail == 0 {
        assert_eq!(regional_out, 0);
        assert_eq!(out.len(), total.min(global_avail));
    }
}

#[test]
fn greedy_invariants_hold_on_random_days() {
    let mut rng = StdRng::seed_from_u64(0x5EED_2025_0815);
    for _ in 0..CASES {
        let recs = random_day(&mut rng);
        let q = random_query(&mut rng);
        let out = select(&recs, &q);
        check_invariants(&recs, &q, &out);
    }
}

#[test]
fn randomized_invariants_hold_on_random_days() {
    let mut rng = StdRng::seed_from_u64(0xD1CE);
    for i in 0..CASES {
        let recs = random_day(&mut rng);
        let q = random_query(&mut rng);
        let strat = SelectionStrategy::Randomized { seed: i as u64 };
        let out = select_with(&recs, &q, strat);
        check_invariants(&recs, &q, &out);
        assert_eq!(out, select_with(&recs, &q, strat), "same seed, same answer");
    }
}

#[test]
fn selecting_twice_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let recs = random_day(&mut rng);
        let q = random_query(&mut rng);
        let once = select(&recs, &q);
        assert_eq!(once, select(&recs, &q));
        // re-selecting the output with an unchanged quota keeps it intact
        let q_again = SelectionQuery {
            min_count: 0,
            max_count: once.len(),
            regional_low: 0.0,
            regional_high: 1.0,
        };
        assert_eq!(select(&once, &q_again), once);
    }
}

#[test]
fn excluded_terms_never_reach_a_selection() {
    let engine = RelevanceEngine::new(&TermsConfig {
        regional_keywords: vec!["india".into()],
        exclude_terms: vec!["festival".into()],
    });
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let n = rng.random_range(1..30);
        let raw: Vec<RawRecord> = (0..n)
            .map(|i| {
                let mut desc = String::from("Something happened");
                if rng.random_bool(0.3) {
                    desc.push_str(" in India");
                }
                if rng.random_bool(0.3) {
                    desc.push_str(" during the harvest Festival");
                }
                RawRecord::new(format!("{i}"), desc, "u")
            })
            .collect();
        let scored = engine.classify_all(raw);
        let out = select(&scored, &random_query(&mut rng));
        assert!(out
            .iter()
            .all(|r| !r.description().to_lowercase().contains("festival")));
    }
}
