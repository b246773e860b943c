// src/selection.rs
//! # Quota Selector
//! Pure logic that turns one day's scored records into a bounded,
//! ratio-constrained selection. No I/O, suitable for unit tests and parallel
//! per-day use.
//!
//! Policy: dedupe by (title, description), rank regional ahead of global and
//! higher score first, take up to the regional high bound, backfill with
//! global records, then swap globals out from the tail until the regional low
//! bound holds (when enough regional candidates exist).

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::relevance::ScoredRecord;

/// Per-run quota. Callers validate `min_count <= max_count` and the ratio
/// bounds before selecting (see `RunConfig::validate`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionQuery {
    pub min_count: usize,
    pub max_count: usize,
    pub regional_low: f64,
    pub regional_high: f64,
}

impl SelectionQuery {
    /// `max(min_count, min(max_count, available))`.
    pub fn total_for(&self, available: usize) -> usize {
        self.min_count.max(self.max_count.min(available))
    }

    /// `(floor(total * low), floor(total * high))`.
    pub fn regional_targets(&self, total: usize) -> (usize, usize) {
        let low = (total as f64 * self.regional_low).floor() as usize;
        let high = (total as f64 * self.regional_high).floor() as usize;
        (low, high)
    }
}

impl Default for SelectionQuery {
    fn default() -> Self {
        Self {
            min_count: 20,
            max_count: 25,
            regional_low: 0.60,
            regional_high: 0.70,
        }
    }
}

/// How candidates are ordered inside each class before the quota is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Best score first. Deterministic.
    #[default]
    Greedy,
    /// Each class is shuffled with the given seed, then filled the same way.
    Randomized { seed: u64 },
}

/// `(is_regional, score)` descending. Used with stable sorts only.
fn rank_desc(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.is_regional
        .cmp(&a.is_regional)
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
}

/// First occurrence of each (title, description) pair wins.
pub fn dedupe(records: &[ScoredRecord]) -> Vec<ScoredRecord> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        if seen.insert((r.title(), r.description())) {
            out.push(r.clone());
        }
    }
    out
}

/// Greedy, deterministic selection.
pub fn select(records: &[ScoredRecord], query: &SelectionQuery) -> Vec<ScoredRecord> {
    select_with(records, query, SelectionStrategy::Greedy)
}

pub fn select_with(
    records: &[ScoredRecord],
    query: &SelectionQuery,
    strategy: SelectionStrategy,
) -> Vec<ScoredRecord> {
    if records.is_empty() {
        return Vec::new();
    }

    // 1) Dedupe, 2) rank
    let mut items = dedupe(records);
    items.sort_by(rank_desc);

    // 3) Quota
    let total = query.total_for(items.len());
    let (low, high) = query.regional_targets(total);

    // 4) Partition (order preserved)
    let (mut regional, mut global): (Vec<ScoredRecord>, Vec<ScoredRecord>) =
        items.into_iter().partition(|r| r.is_regional);

    if let SelectionStrategy::Randomized { seed } = strategy {
        let mut rng = StdRng::seed_from_u64(seed);
        regional.shuffle(&mut rng);
        global.shuffle(&mut rng);
    }

    // 5) Greedy fill: regional up to the high bound, then global backfill
    let mut selected: Vec<ScoredRecord> = regional.iter().take(high).cloned().collect();
    let need = total.saturating_sub(selected.len());
    selected.extend(global.iter().take(need).cloned());

    // 6) Low-bound repair
    let repaired = repair_low_bound(&mut selected, &regional, low);

    // 7) Final order + truncate
    selected.sort_by(rank_desc);
    selected.truncate(total);

    debug!(
        target: "selection",
        candidates = regional.len() + global.len(),
        regional_candidates = regional.len(),
        total,
        low,
        high,
        repaired,
        selected = selected.len(),
        "day selected"
    );

    selected
}

/// Swap global entries (scanning from the tail) for unused regional ones
/// until the low bound holds or either side runs out. Never grows `selected`.
/// Returns the number of swaps.
fn repair_low_bound(
    selected: &mut [ScoredRecord],
    regional: &[ScoredRecord],
    low: usize,
) -> usize {
    // Regional entries in `selected` are always a prefix of `regional`.
    let in_selection = selected.iter().filter(|r| r.is_regional).count();
    if in_selection >= low || regional.len() <= in_selection {
        return 0;
    }

    let mut missing = low - in_selection;
    let mut next = in_selection;
    let mut swaps = 0;
    for slot in selected.iter_mut().rev() {
        if missing == 0 || next >= regional.len() {
            break;
        }
        if !slot.is_regional {
            *slot = regional[next].clone();
            next += 1;
            missing -= 1;
            swaps += 1;
        }
    }
    swaps
}
