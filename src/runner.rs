// src/runner.rs
//! Month orchestration: fetch each day page, classify, select, write CSV.

use anyhow::Result;
use metrics::counter;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::calendar::{days_in_month, month_label};
use crate::config::run::RunConfig;
use crate::config::terms::{load_terms_default, load_terms_from, TermsConfig};
use crate::export::save_csv;
use crate::ingest::types::{DaySource, RawRecord};
use crate::relevance::{RelevanceEngine, ScoredRecord};
use crate::selection::{select_with, SelectionQuery, SelectionStrategy};

/// Summary of what was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outfile: PathBuf,
    pub days_written: usize,
    pub rows_written: usize,
    /// Days whose page produced no records.
    pub days_skipped: Vec<u32>,
}

/// `--terms` wins, otherwise env/config fallbacks, otherwise the built-in seed.
pub fn load_terms(cfg: &RunConfig) -> Result<TermsConfig> {
    match &cfg.terms_path {
        Some(p) => load_terms_from(p),
        None => load_terms_default(),
    }
}

/// Per-day seed so randomized days differ but the run is reproducible.
pub fn strategy_for_day(strategy: SelectionStrategy, day: u32) -> SelectionStrategy {
    match strategy {
        SelectionStrategy::Greedy => SelectionStrategy::Greedy,
        SelectionStrategy::Randomized { seed } => SelectionStrategy::Randomized {
            seed: seed.wrapping_add(u64::from(day)),
        },
    }
}

/// Exclusion pre-filter + scoring + quota selection for one day.
pub fn select_day(
    engine: &RelevanceEngine,
    raw: Vec<RawRecord>,
    query: &SelectionQuery,
    strategy: SelectionStrategy,
) -> Vec<ScoredRecord> {
    let raw_len = raw.len();
    let scored = engine.classify_all(raw);
    counter!("ingest_excluded_total").increment((raw_len - scored.len()) as u64);
    select_with(&scored, query, strategy)
}

fn polite_delay(cfg: &RunConfig) -> Duration {
    let jitter = cfg.delay_jitter.mul_f64(rand::random::<f64>());
    cfg.delay_min + jitter
}

/// Fetch and select every day of the configured month. Days without data are
/// skipped with a warning.
pub async fn collect_month<S>(
    cfg: &RunConfig,
    source: &S,
    engine: &RelevanceEngine,
) -> Result<(BTreeMap<u32, Vec<ScoredRecord>>, Vec<u32>)>
where
    S: DaySource + Sync + ?Sized,
{
    let label = month_label(cfg.month);
    let days = days_in_month(cfg.month);
    let mut per_day = BTreeMap::new();
    let mut skipped = Vec::new();

    for day in 1..=days {
        let raw = source.fetch_day(cfg.month, day, cfg.sections).await?;
        let chosen = if raw.is_empty() {
            Vec::new()
        } else {
            select_day(engine, raw, &cfg.query, strategy_for_day(cfg.strategy, day))
        };
        // A page whose items were all excluded counts as empty.
        if chosen.is_empty() {
            warn!(month = label, day, provider = source.name(), "no data for day");
            skipped.push(day);
        } else {
            info!(
                month = label,
                day,
                selected = chosen.len(),
                regional = chosen.iter().filter(|r| r.is_regional).count(),
                "day done"
            );
            per_day.insert(day, chosen);
        }

        let pause = polite_delay(cfg);
        if day < days && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    Ok((per_day, skipped))
}

/// Top-level runner: collect the month, then write the CSV.
pub async fn run_month<S>(cfg: &RunConfig, source: &S, engine: &RelevanceEngine) -> Result<RunSummary>
where
    S: DaySource + Sync + ?Sized,
{
    cfg.validate()?;
    let q = &cfg.query;
    info!(
        month = month_label(cfg.month),
        min = q.min_count,
        max = q.max_count,
        regional_low = q.regional_low,
        regional_high = q.regional_high,
        births = cfg.sections.births,
        deaths = cfg.sections.deaths,
        strategy = ?cfg.strategy,
        "building month"
    );

    let (per_day, days_skipped) = collect_month(cfg, source, engine).await?;
    let rows_written = save_csv(&cfg.outfile, cfg.month, &per_day)?;

    Ok(RunSummary {
        outfile: cfg.outfile.clone(),
        days_written: per_day.len(),
        rows_written,
        days_skipped,
    })
}
