// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{RawRecord, SectionToggles};
use metrics::describe_counter;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

pub const WIKI_ORIGIN: &str = "https://en.wikipedia.org";
/// Longest title derived from a description when an item has no link text.
pub const FALLBACK_TITLE_CHARS: usize = 120;

/// One-time metrics registration (so series carry descriptions once a recorder exists).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_pages_total", "Day pages fetched successfully.");
        describe_counter!(
            "ingest_page_errors_total",
            "Day pages that failed after all retries."
        );
        describe_counter!("ingest_records_total", "Raw records parsed from day pages.");
        describe_counter!(
            "ingest_excluded_total",
            "Records dropped by the exclude-term pre-filter."
        );
    });
}

static RE_BLOCK_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:ul|ol|li|br|p|div|dd|dt|dl)\b[^>]*>").unwrap());
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static RE_CITATIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*\d+\s*\]").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([23])\b[^>]*>(.*?)</h[23]\s*>").unwrap());
static RE_LIST_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)(ul|ol|li)\b[^>]*>").unwrap());
static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#).unwrap()
});
static RE_YEAR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(\d{1,4})\s*[–-]\s*(.*)$").unwrap());

/// Normalize markup to plain text: strip tags, decode entities, drop citation
/// markers, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) Block-level tags become spaces, everything else disappears
    let out = RE_BLOCK_TAGS.replace_all(s, " ");
    let out = RE_TAGS.replace_all(&out, "");

    // 2) HTML entity decode (after stripping, so "&lt;b&gt;" stays literal text)
    let out = html_escape::decode_html_entities(&out).to_string();

    // 3) Footnote markers like "[12]"
    let out = RE_CITATIONS.replace_all(&out, "");

    // 4) Collapse whitespace (incl. NBSP)
    let out = out.replace('\u{00A0}', " ");
    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// Split "1947 – India gains independence" into its description part.
/// Text without a leading year is returned as-is.
pub fn strip_year_prefix(text: &str) -> &str {
    match RE_YEAR_PREFIX.captures(text).and_then(|c| c.get(2)) {
        Some(m) => m.as_str(),
        None => text,
    }
}

/// Make wiki-relative links absolute.
pub fn absolutize_href(href: &str) -> String {
    let href = html_escape::decode_html_entities(href);
    if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{WIKI_ORIGIN}{href}")
    } else {
        href.into_owned()
    }
}

/// First sentence of `desc`, at most `FALLBACK_TITLE_CHARS` characters.
pub fn fallback_title(desc: &str) -> String {
    let first = desc.split('.').next().unwrap_or_default();
    first.chars().take(FALLBACK_TITLE_CHARS).collect()
}

/// Result of parsing one day page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDay {
    pub records: Vec<RawRecord>,
    /// At least one enabled section heading was present.
    pub found_section: bool,
}

struct Heading {
    level: u8,
    name: String,
    start: usize,
    end: usize,
}

fn headings(html: &str) -> Vec<Heading> {
    RE_HEADING
        .captures_iter(html)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let level = c.get(1)?.as_str().parse::<u8>().ok()?;
            // "Events [ edit ]" → "events"
            let text = normalize_text(c.get(2)?.as_str());
            let name = text.split('[').next().unwrap_or_default().trim().to_lowercase();
            Some(Heading {
                level,
                name,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Inner HTML of every top-level `<li>` in `region`.
fn top_level_items(region: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut li_depth = 0usize;
    let mut item_start = 0usize;
    for c in RE_LIST_TAG.captures_iter(region) {
        let (Some(whole), Some(tag)) = (c.get(0), c.get(2)) else {
            continue;
        };
        if !tag.as_str().eq_ignore_ascii_case("li") {
            continue;
        }
        let closing = c.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            if li_depth == 1 {
                out.push(&region[item_start..whole.start()]);
            }
            li_depth = li_depth.saturating_sub(1);
        } else {
            if li_depth == 0 {
                item_start = whole.end();
            }
            li_depth += 1;
        }
    }
    out
}

fn record_from_item(item_html: &str, page_url: &str) -> Option<RawRecord> {
    let text = normalize_text(item_html);
    if text.is_empty() {
        return None;
    }
    let description = strip_year_prefix(&text).to_string();

    let (mut title, source_url) = match RE_ANCHOR.captures(item_html) {
        Some(c) => (
            normalize_text(c.get(2).map_or("", |m| m.as_str())),
            absolutize_href(c.get(1).map_or("", |m| m.as_str())),
        ),
        None => (String::new(), page_url.to_string()),
    };
    if title.is_empty() {
        title = fallback_title(&description);
    }

    Some(RawRecord {
        title,
        description,
        source_url,
    })
}

/// Parse the enabled sections of a Wikipedia "Month_Day" page.
///
/// A matched `h2` section runs until the next `h2`, so `h3` sub-periods
/// ("Pre-1600", "1601–1900", ...) belong to it. A matched `h3` runs until the
/// next heading of any level.
pub fn parse_day_page(html: &str, page_url: &str, sections: SectionToggles) -> ParsedDay {
    let hs = headings(html);
    let mut parsed = ParsedDay::default();

    for (i, h) in hs.iter().enumerate() {
        if !sections.enabled(&h.name) {
            continue;
        }
        parsed.found_section = true;

        let region_end = hs[i + 1..]
            .iter()
            .find(|next| next.level <= h.level)
            .map_or(html.len(), |next| next.start);
        let region = &html[h.end..region_end];

        parsed.records.extend(
            top_level_items(region)
                .into_iter()
                .filter_map(|item| record_from_item(item, page_url)),
        );
    }

    parsed
}
