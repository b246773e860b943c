// tests/runner_e2e.rs
//
// Whole-month run against fixture pages: no network, no delay.

use chrono::Month;
use history_quota::config::run::RunConfig;
use history_quota::ingest::providers::wikipedia::WikipediaDaySource;
use history_quota::relevance::RelevanceEngine;
use history_quota::runner::{collect_month, run_month};
use history_quota::selection::{SelectionQuery, SelectionStrategy};
use std::fs;
use std::time::Duration;

fn fixture() -> String {
    fs::read_to_string("tests/fixtures/august_15.html").expect("fixture")
}

fn cfg(outfile: std::path::PathBuf) -> RunConfig {
    let mut cfg = RunConfig::new(Month::August);
    cfg.query = SelectionQuery {
        min_count: 5,
        max_count: 5,
        regional_low: 0.6,
        regional_high: 0.7,
    };
    cfg.outfile = outfile;
    cfg.delay_min = Duration::ZERO;
    cfg.delay_jitter = Duration::ZERO;
    cfg
}

#[tokio::test]
async fn month_run_writes_only_days_with_data() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("august.csv");
    let source = WikipediaDaySource::from_fixtures(vec![(1, fixture()), (15, fixture())]);
    let engine = RelevanceEngine::default();

    let summary = run_month(&cfg(out.clone()), &source, &engine)
        .await
        .expect("run ok");

    assert_eq!(summary.days_written, 2);
    assert_eq!(summary.rows_written, 10);
    assert_eq!(summary.days_skipped.len(), 29);
    assert!(!summary.days_skipped.contains(&15));

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines[0], "Date,Title,Description,Source");
    assert_eq!(lines.len(), 11);
    assert!(lines[1].starts_with("01 August,"));
    assert!(lines[10].starts_with("15 August,"));
    // regional first within the day
    assert!(lines[1].contains("India") || lines[1].contains("Bombay"));
}

#[tokio::test]
async fn per_day_quota_and_dedupe_apply() {
    let source = WikipediaDaySource::from_fixtures(vec![(15, fixture())]);
    let engine = RelevanceEngine::default();
    let tmp = tempfile::tempdir().unwrap();
    let c = cfg(tmp.path().join("x.csv"));

    let (per_day, skipped) = collect_month(&c, &source, &engine).await.unwrap();
    assert_eq!(skipped.len(), 30);
    let day = &per_day[&15];

    // 3 regional (Congress, 1947, Sholay) + 2 best globals
    assert_eq!(day.len(), 5);
    assert_eq!(day.iter().filter(|r| r.is_regional).count(), 3);
    assert_eq!(
        day.iter()
            .filter(|r| r.description().starts_with("India gains independence"))
            .count(),
        1,
        "duplicate 1947 item collapsed"
    );
    assert!(day[..3].iter().all(|r| r.is_regional));
}

#[tokio::test]
async fn day_with_only_excluded_items_is_skipped() {
    let observances = r#"<html><body>
<h2 id="Events">Events</h2>
<ul>
<li><a href="/wiki/Harvest">Harvest</a> – The village harvest festival begins.</li>
<li><a href="/wiki/Christmas_Eve">Christmas Eve</a> – Christmas celebrations in the square.</li>
</ul>
</body></html>"#;
    let source = WikipediaDaySource::from_fixtures(vec![
        (1, fixture()),
        (3, observances.to_string()),
    ]);
    let engine = RelevanceEngine::default();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("obs.csv");

    let summary = run_month(&cfg(out.clone()), &source, &engine)
        .await
        .expect("run ok");

    assert_eq!(summary.days_written, 1);
    assert_eq!(summary.rows_written, 5);
    assert!(summary.days_skipped.contains(&3));
    assert_eq!(summary.days_skipped.len(), 30);

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.contains("03 August"));
}

#[tokio::test]
async fn randomized_runs_are_reproducible() {
    let source = WikipediaDaySource::from_fixtures(vec![(15, fixture())]);
    let engine = RelevanceEngine::default();
    let tmp = tempfile::tempdir().unwrap();
    let mut c = cfg(tmp.path().join("x.csv"));
    c.query.min_count = 3;
    c.query.max_count = 3;
    c.strategy = SelectionStrategy::Randomized { seed: 11 };

    let (a, _) = collect_month(&c, &source, &engine).await.unwrap();
    let (b, _) = collect_month(&c, &source, &engine).await.unwrap();
    assert_eq!(a, b);
    // floor(3*0.6)=1 .. floor(3*0.7)=2 regional
    let regional = a[&15].iter().filter(|r| r.is_regional).count();
    assert!((1..=2).contains(&regional));
}

#[tokio::test]
async fn invalid_quota_is_rejected_before_any_fetch() {
    let source = WikipediaDaySource::from_fixtures(Vec::<(u32, String)>::new());
    let engine = RelevanceEngine::default();
    let tmp = tempfile::tempdir().unwrap();
    let mut c = cfg(tmp.path().join("x.csv"));
    c.query.min_count = 9;
    c.query.max_count = 2;
    assert!(run_month(&c, &source, &engine).await.is_err());
    assert!(!tmp.path().join("x.csv").exists());
}
