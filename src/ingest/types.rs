// src/ingest/types.rs
use anyhow::Result;
use chrono::Month;

/// One historical item scraped from a day page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub title: String,
    pub description: String,
    pub source_url: String,
}

impl RawRecord {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source_url: source_url.into(),
        }
    }
}

/// Which page sections feed the record list. Events are always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionToggles {
    pub births: bool,
    pub deaths: bool,
}

impl SectionToggles {
    pub fn events_only() -> Self {
        Self {
            births: false,
            deaths: false,
        }
    }

    /// Heading text (lowercased) → enabled?
    pub fn enabled(&self, heading: &str) -> bool {
        match heading {
            "events" => true,
            "births" => self.births,
            "deaths" => self.deaths,
            _ => false,
        }
    }
}

#[async_trait::async_trait]
pub trait DaySource {
    async fn fetch_day(&self, month: Month, day: u32, sections: SectionToggles)
        -> Result<Vec<RawRecord>>;
    fn name(&self) -> &'static str;
}
