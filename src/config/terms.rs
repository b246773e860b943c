// src/config/terms.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_TERMS_PATH: &str = "HISTORY_TERMS_PATH";
pub const DEFAULT_TERMS_TOML: &str = "config/terms.toml";
pub const DEFAULT_TERMS_JSON: &str = "config/terms.json";

/// Regional keyword set + exclude-term set consumed by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TermsConfig {
    #[serde(default)]
    pub regional_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_terms: Vec<String>,
}

impl TermsConfig {
    /// Built-in seed: Indian history keywords and observance/festival excludes.
    /// Trailing spaces are deliberate ("saint ", "inc ").
    pub fn default_seed() -> Self {
        let regional = [
            "india", "indian", "bharat", "delhi", "mumbai", "bombay", "calcutta", "kolkata",
            "madras", "chennai", "bengal", "punjab", "assam", "hyderabad", "mysore",
            "travancore", "awadh", "gujarat", "maharashtra", "isro", "drdo", "incospar", "iit",
            "iisc", "inc ", "congress", "bjp", "nehru", "gandhi", "ambedkar", "bhagat singh",
            "subhas", "tilak", "patel", "swaraj", "satyagraha", "quit india", "swadeshi",
            "dandi", "ina", "azad hind", "hockey", "cricket",
        ];
        let exclude = [
            "festival", "observance", "holiday", "feast", "day of", "saint ", "eid", "diwali",
            "holi", "janmashtami", "navroz", "christmas", "easter", "good friday", "ramadan",
            "ramzan", "gurpurab", "baisakhi", "pongal", "onam", "durga puja", "ganesh chaturthi",
            "mahashivratri", "mahavir jayanti", "buddha purnima", "mahotsav",
        ];
        Self {
            regional_keywords: regional.iter().map(|s| s.to_string()).collect(),
            exclude_terms: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn cleaned(self) -> Self {
        Self {
            regional_keywords: clean_list(self.regional_keywords),
            exclude_terms: clean_list(self.exclude_terms),
        }
    }
}

/// Load terms from an explicit path. Supports TOML or JSON formats.
pub fn load_terms_from(path: &Path) -> Result<TermsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading terms from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_terms(&content, ext.as_str())
        .with_context(|| format!("parsing terms in {}", path.display()))
}

/// Load terms using env var + fallbacks:
/// 1) $HISTORY_TERMS_PATH
/// 2) config/terms.toml
/// 3) config/terms.json
/// 4) built-in seed
pub fn load_terms_default() -> Result<TermsConfig> {
    if let Ok(p) = std::env::var(ENV_TERMS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_terms_from(&pb);
        } else {
            return Err(anyhow!("{ENV_TERMS_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_TERMS_TOML);
    if toml_p.exists() {
        return load_terms_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_TERMS_JSON);
    if json_p.exists() {
        return load_terms_from(&json_p);
    }
    Ok(TermsConfig::default_seed())
}

fn parse_terms(s: &str, hint_ext: &str) -> Result<TermsConfig> {
    if hint_ext == "json" {
        return parse_json(s);
    }
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    // No usable extension: sniff.
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    parse_toml(s).map_err(|_| anyhow!("unsupported terms format"))
}

fn parse_toml(s: &str) -> Result<TermsConfig> {
    let v: TermsConfig = toml::from_str(s)?;
    Ok(v.cleaned())
}

fn parse_json(s: &str) -> Result<TermsConfig> {
    let v: TermsConfig = serde_json::from_str(s)?;
    Ok(v.cleaned())
}

// Lowercase, drop blanks, dedup keeping first occurrence. No trimming: spacing
// inside a term is part of the match.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        if it.trim().is_empty() {
            continue;
        }
        let t = it.to_lowercase();
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
