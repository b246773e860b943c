// src/ingest/providers/wikipedia.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Month;
use metrics::counter;
use std::collections::HashMap;
use std::time::Duration;

use crate::ingest::types::{DaySource, RawRecord, SectionToggles};
use crate::ingest::{ensure_metrics_described, parse_day_page, WIKI_ORIGIN};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; HistMonthBot/2.1)";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `https://en.wikipedia.org/wiki/August_15`
pub fn day_page_url(month: Month, day: u32) -> String {
    format!("{WIKI_ORIGIN}/wiki/{}_{}", month.name(), day)
}

/// Tries per page and the linear backoff step (sleep `backoff * try_no`).
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub tries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

pub struct WikipediaDaySource {
    mode: Mode,
}

enum Mode {
    // Day → page HTML; missing days behave like a failed fetch.
    Fixture(HashMap<u32, String>),
    Http {
        client: reqwest::Client,
        retry: RetryPolicy,
    },
}

impl WikipediaDaySource {
    pub fn from_http(retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building wikipedia http client")?;
        Ok(Self {
            mode: Mode::Http { client, retry },
        })
    }

    /// Serve the same page HTML for every day.
    pub fn from_fixture_str(html: &str) -> Self {
        Self::from_fixtures((1..=31).map(|d| (d, html.to_string())))
    }

    pub fn from_fixtures<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = (u32, String)>,
    {
        Self {
            mode: Mode::Fixture(pages.into_iter().collect()),
        }
    }

    /// GET with retries. `None` once every try failed.
    async fn http_get(client: &reqwest::Client, retry: RetryPolicy, url: &str) -> Option<String> {
        let tries = retry.tries.max(1);
        for i in 0..tries {
            match client.get(url).send().await {
                Ok(resp) if resp.status() == reqwest::StatusCode::OK => match resp.text().await {
                    Ok(body) => return Some(body),
                    Err(e) => {
                        tracing::warn!(error = ?e, url, attempt = i + 1, tries, "reading body failed")
                    }
                },
                Ok(resp) => {
                    tracing::warn!(status = %resp.status(), url, attempt = i + 1, tries, "unexpected http status")
                }
                Err(e) => tracing::warn!(error = ?e, url, attempt = i + 1, tries, "http get failed"),
            }
            tokio::time::sleep(retry.backoff * (i + 1)).await;
        }
        None
    }

    fn parse(html: &str, url: &str, sections: SectionToggles) -> Vec<RawRecord> {
        let parsed = parse_day_page(html, url, sections);
        if !parsed.found_section {
            tracing::warn!(url, "no Events/Births/Deaths sections found");
        }
        counter!("ingest_records_total").increment(parsed.records.len() as u64);
        parsed.records
    }
}

#[async_trait]
impl DaySource for WikipediaDaySource {
    async fn fetch_day(
        &self,
        month: Month,
        day: u32,
        sections: SectionToggles,
    ) -> Result<Vec<RawRecord>> {
        ensure_metrics_described();
        let url = day_page_url(month, day);

        let body = match &self.mode {
            Mode::Fixture(pages) => pages.get(&day).cloned(),
            Mode::Http { client, retry } => Self::http_get(client, *retry, &url).await,
        };

        match body {
            Some(html) => {
                counter!("ingest_pages_total").increment(1);
                Ok(Self::parse(&html, &url, sections))
            }
            None => {
                counter!("ingest_page_errors_total").increment(1);
                tracing::warn!(url, provider = self.name(), "giving up on day page");
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &'static str {
        "Wikipedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_english_month_name() {
        assert_eq!(
            day_page_url(Month::February, 29),
            "https://en.wikipedia.org/wiki/February_29"
        );
    }

    #[tokio::test]
    async fn missing_fixture_day_yields_empty() {
        let src = WikipediaDaySource::from_fixtures(vec![(1, "<h2>Events</h2>".to_string())]);
        let out = src
            .fetch_day(Month::March, 2, SectionToggles::events_only())
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
