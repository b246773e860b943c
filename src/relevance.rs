// src/relevance.rs
//! Regional classifier: exclusion pre-filter, keyword + length scoring, and the
//! regional/global split that the quota selector works on.
//!
//! Everything here is pure. Term lists come in through `TermsConfig` and are
//! lowercased once at construction, so scoring is a handful of substring scans.

use tracing::info;

use crate::config::terms::TermsConfig;
use crate::ingest::types::RawRecord;

// --- scoring constants ---
pub const REGIONAL_KEYWORD_BONUS: f64 = 50.0;
pub const LENGTH_BONUS_DIVISOR: f64 = 200.0;
pub const LENGTH_BONUS_CAP: f64 = 10.0;
/// A record is regional exactly when the keyword bonus was applied; the length
/// bonus alone tops out at `LENGTH_BONUS_CAP` and never reaches this.
pub const REGIONAL_THRESHOLD: f64 = REGIONAL_KEYWORD_BONUS;

pub const ENV_DEV_LOG: &str = "HISTORY_DEV_LOG";

// Dev logging gate: HISTORY_DEV_LOG=1 AND a debug build
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    on && cfg!(debug_assertions)
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger for classifier decisions.
fn dev_log_relevance(event: &str, text: &str, term: Option<&str>, score: f64) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    // Never log raw text. Only hashed id + the matching term.
    info!(target: "relevance", %id, %score, event, term = term.unwrap_or("-"));
}

/// A raw record after scoring. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: RawRecord,
    pub score: f64,
    pub is_regional: bool,
}

impl ScoredRecord {
    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn source_url(&self) -> &str {
        &self.record.source_url
    }
}

/// `title + " " + description`, without a dangling space when either side is empty.
pub fn joined_text(record: &RawRecord) -> String {
    match (record.title.is_empty(), record.description.is_empty()) {
        (true, _) => record.description.clone(),
        (false, true) => record.title.clone(),
        (false, false) => format!("{} {}", record.title, record.description),
    }
}

/// Unconditional bonus for longer text, capped at `LENGTH_BONUS_CAP`.
pub fn length_bonus(text: &str) -> f64 {
    (text.chars().count() as f64 / LENGTH_BONUS_DIVISOR).min(LENGTH_BONUS_CAP)
}

/// Classifier holding the lowercased regional keyword and exclude-term sets.
#[derive(Debug, Clone)]
pub struct RelevanceEngine {
    regional: Vec<String>,
    exclude: Vec<String>,
}

impl RelevanceEngine {
    pub fn new(terms: &TermsConfig) -> Self {
        Self {
            regional: terms
                .regional_keywords
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            exclude: terms.exclude_terms.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Engine over the built-in seed lists.
    pub fn with_default_terms() -> Self {
        Self::new(&TermsConfig::default_seed())
    }

    fn first_hit<'a>(terms: &'a [String], lowered: &str) -> Option<&'a str> {
        terms
            .iter()
            .find(|t| !t.is_empty() && lowered.contains(t.as_str()))
            .map(|t| t.as_str())
    }

    /// The exclude term that drops this record, if any.
    pub fn exclusion_for(&self, record: &RawRecord) -> Option<&str> {
        let lowered = joined_text(record).to_lowercase();
        Self::first_hit(&self.exclude, &lowered)
    }

    pub fn is_excluded(&self, record: &RawRecord) -> bool {
        self.exclusion_for(record).is_some()
    }

    /// Score a record and classify it as regional or global.
    pub fn classify_and_score(&self, record: RawRecord) -> ScoredRecord {
        let text = joined_text(&record);
        let lowered = text.to_lowercase();

        let keyword = Self::first_hit(&self.regional, &lowered);
        let mut score = length_bonus(&text);
        if keyword.is_some() {
            score += REGIONAL_KEYWORD_BONUS;
        }
        let is_regional = score >= REGIONAL_THRESHOLD;

        dev_log_relevance(
            if is_regional { "regional" } else { "global" },
            &text,
            keyword,
            score,
        );

        ScoredRecord {
            record,
            score,
            is_regional,
        }
    }

    /// Exclusion pre-filter followed by scoring. Excluded records never become
    /// `ScoredRecord`s.
    pub fn classify_all<I>(&self, records: I) -> Vec<ScoredRecord>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut out = Vec::new();
        for rec in records {
            if let Some(term) = self.exclusion_for(&rec) {
                dev_log_relevance("excluded", &joined_text(&rec), Some(term), 0.0);
                continue;
            }
            out.push(self.classify_and_score(rec));
        }
        out
    }
}

impl Default for RelevanceEngine {
    fn default() -> Self {
        Self::with_default_terms()
    }
}
