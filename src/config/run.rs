// src/config/run.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::Month;
use std::path::PathBuf;
use std::time::Duration;

use crate::calendar::normalize_month;
use crate::ingest::types::SectionToggles;
use crate::selection::{SelectionQuery, SelectionStrategy};

pub const DEFAULT_OUTFILE: &str = "events.csv";
pub const DEFAULT_DELAY_MIN: Duration = Duration::from_millis(400);
pub const DEFAULT_DELAY_JITTER: Duration = Duration::from_millis(300);

pub const HELP: &str = "\
Build a monthly historical-events CSV with a regional:global mix.

Usage: history-quota --month <NAME|1-12> [options]

Options:
  --month <M>            Month name or number (e.g. 'august' or '8'). Required.
  --min <N>              Minimum events per day (default 20).
  --max <N>              Maximum events per day (default 25).
  --regional-low <F>     Lower bound of the regional share (default 0.60).
  --regional-high <F>    Upper bound of the regional share (default 0.70).
                         (--india-low / --india-high are accepted too.)
  --include-births       Include notable births (default off).
  --include-deaths       Include notable deaths (default off).
  --outfile <PATH>       Output CSV filename (default events.csv).
  --strategy <S>         greedy (default) | random
  --seed <N>             Seed for --strategy random (default 0).
  --terms <PATH>         Keyword/exclude terms file (TOML or JSON).
  -h, --help             Show this help.

Environment:
  HISTORY_TERMS_PATH     Terms file when --terms is not given.
  HISTORY_DEV_LOG        1 = per-record relevance logs (debug builds only).
  RUST_LOG               Log filter (default info).
";

/// Everything one monthly run needs. Built from CLI args, then validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub month: Month,
    pub query: SelectionQuery,
    pub sections: SectionToggles,
    pub outfile: PathBuf,
    pub strategy: SelectionStrategy,
    pub terms_path: Option<PathBuf>,
    /// Polite pause between day pages: `delay_min + U(0,1) * delay_jitter`.
    pub delay_min: Duration,
    pub delay_jitter: Duration,
}

impl RunConfig {
    pub fn new(month: Month) -> Self {
        Self {
            month,
            query: SelectionQuery::default(),
            sections: SectionToggles::events_only(),
            outfile: PathBuf::from(DEFAULT_OUTFILE),
            strategy: SelectionStrategy::Greedy,
            terms_path: None,
            delay_min: DEFAULT_DELAY_MIN,
            delay_jitter: DEFAULT_DELAY_JITTER,
        }
    }

    /// Reject quotas the selector must never see.
    pub fn validate(&self) -> Result<()> {
        let q = &self.query;
        if q.min_count > q.max_count {
            bail!("--min ({}) must not exceed --max ({})", q.min_count, q.max_count);
        }
        for (name, v) in [("regional-low", q.regional_low), ("regional-high", q.regional_high)] {
            if !(0.0..=1.0).contains(&v) {
                bail!("--{name} must be within [0, 1], got {v}");
            }
        }
        if q.regional_low > q.regional_high {
            bail!(
                "--regional-low ({}) must not exceed --regional-high ({})",
                q.regional_low,
                q.regional_high
            );
        }
        Ok(())
    }
}

/// Outcome of argument parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(RunConfig),
    Help,
}

/// Parse CLI args (without the program name).
pub fn parse_args<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);

    let mut month_raw: Option<String> = None;
    let mut query = SelectionQuery::default();
    let mut sections = SectionToggles::events_only();
    let mut outfile = PathBuf::from(DEFAULT_OUTFILE);
    let mut strategy_name = String::from("greedy");
    let mut seed: u64 = 0;
    let mut terms_path = None;

    while let Some(a) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| anyhow!("Missing value for {flag}"));
        match a.as_str() {
            "--month" => month_raw = Some(value("--month")?),
            "--min" => query.min_count = parse_num(&value("--min")?, "--min")?,
            "--max" => query.max_count = parse_num(&value("--max")?, "--max")?,
            "--regional-low" | "--india-low" => {
                query.regional_low = parse_num(&value(a.as_str())?, &a)?;
            }
            "--regional-high" | "--india-high" => {
                query.regional_high = parse_num(&value(a.as_str())?, &a)?;
            }
            "--include-births" => sections.births = true,
            "--include-deaths" => sections.deaths = true,
            "-o" | "--outfile" => outfile = PathBuf::from(value(a.as_str())?),
            "--strategy" => strategy_name = value("--strategy")?.to_ascii_lowercase(),
            "--seed" => seed = parse_num(&value("--seed")?, "--seed")?,
            "--terms" => terms_path = Some(PathBuf::from(value("--terms")?)),
            "-h" | "--help" => return Ok(Command::Help),
            other => bail!("Unknown arg: {other}"),
        }
    }

    let month_raw = month_raw.ok_or_else(|| anyhow!("--month is required"))?;
    let month = normalize_month(&month_raw).ok_or_else(|| {
        anyhow!("Unknown month '{month_raw}'. Use names like 'August' or numbers 1-12.")
    })?;

    let strategy = match strategy_name.as_str() {
        "greedy" => SelectionStrategy::Greedy,
        "random" | "randomized" => SelectionStrategy::Randomized { seed },
        other => bail!("Unknown strategy: {other}"),
    };

    let cfg = RunConfig {
        query,
        sections,
        outfile,
        strategy,
        terms_path,
        ..RunConfig::new(month)
    };
    cfg.validate()?;
    Ok(Command::Run(cfg))
}

fn parse_num<T>(raw: &str, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid value for {flag}: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> RunConfig {
        match parse_args(args.iter().copied()).expect("parse ok") {
            Command::Run(cfg) => cfg,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = run(&["--month", "august"]);
        assert_eq!(cfg.month, Month::August);
        assert_eq!(cfg.query, SelectionQuery::default());
        assert_eq!(cfg.query.min_count, 20);
        assert_eq!(cfg.query.max_count, 25);
        assert_eq!(cfg.outfile, PathBuf::from("events.csv"));
        assert_eq!(cfg.strategy, SelectionStrategy::Greedy);
        assert!(!cfg.sections.births && !cfg.sections.deaths);
    }

    #[test]
    fn all_flags_parse() {
        let cfg = run(&[
            "--month", "3", "--min", "5", "--max", "8", "--india-low", "0.5",
            "--regional-high", "0.9", "--include-births", "--include-deaths",
            "--outfile", "out/march.csv", "--strategy", "random", "--seed", "7",
            "--terms", "terms.toml",
        ]);
        assert_eq!(cfg.month, Month::March);
        assert_eq!(cfg.query.min_count, 5);
        assert_eq!(cfg.query.max_count, 8);
        assert_eq!(cfg.query.regional_low, 0.5);
        assert_eq!(cfg.query.regional_high, 0.9);
        assert!(cfg.sections.births && cfg.sections.deaths);
        assert_eq!(cfg.strategy, SelectionStrategy::Randomized { seed: 7 });
        assert_eq!(cfg.terms_path, Some(PathBuf::from("terms.toml")));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(["--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(parse_args(["--min", "5"]).is_err(), "month required");
        assert!(parse_args(["--month", "Smarch"]).is_err());
        assert!(parse_args(["--month", "8", "--min", "30", "--max", "10"]).is_err());
        assert!(parse_args(["--month", "8", "--regional-low", "0.8", "--regional-high", "0.5"]).is_err());
        assert!(parse_args(["--month", "8", "--regional-high", "1.5"]).is_err());
        assert!(parse_args(["--month", "8", "--min", "-1"]).is_err());
        assert!(parse_args(["--month", "8", "--strategy", "clever"]).is_err());
        assert!(parse_args(["--month", "8", "--bogus"]).is_err());
        assert!(parse_args(["--month"]).is_err());
    }
}
