//! history-quota: binary entrypoint
//! Parses CLI args, loads terms, and builds one month's CSV from Wikipedia
//! day pages.

use anyhow::Context;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use history_quota::config::run::{parse_args, Command, HELP};
use history_quota::ingest::providers::wikipedia::{RetryPolicy, WikipediaDaySource};
use history_quota::relevance::RelevanceEngine;
use history_quota::runner::{load_terms, run_month};

/// Compact logs to stderr. `RUST_LOG` overrides the default `info` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

async fn run() -> anyhow::Result<()> {
    let cfg = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            eprintln!("{HELP}");
            return Ok(());
        }
        Command::Run(cfg) => cfg,
    };

    let terms = load_terms(&cfg).context("loading regional/exclude terms")?;
    let engine = RelevanceEngine::new(&terms);
    let source = WikipediaDaySource::from_http(RetryPolicy::default())?;

    let summary = run_month(&cfg, &source, &engine).await?;
    info!(
        outfile = %summary.outfile.display(),
        days = summary.days_written,
        rows = summary.rows_written,
        skipped = summary.days_skipped.len(),
        "done"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "run failed");
            ExitCode::FAILURE
        }
    }
}
