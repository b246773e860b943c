// src/calendar.rs
//! Month parsing and day counts for the monthly run.

use chrono::Month;
use std::str::FromStr;

/// Accepts `1..=12`, a full English month name, or chrono's three-letter
/// abbreviation, case-insensitive and trimmed.
pub fn normalize_month(input: &str) -> Option<Month> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let n: u8 = s.parse().ok()?;
        return Month::try_from(n).ok();
    }
    Month::from_str(s).ok()
}

/// Days to fetch for `month`. February always includes the 29th since the
/// `February_29` page exists every year.
pub fn days_in_month(month: Month) -> u32 {
    match month {
        Month::February => 29,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// "August"
pub fn month_label(month: Month) -> &'static str {
    month.name()
}

/// "05 August"
pub fn date_label(month: Month, day: u32) -> String {
    format!("{:02} {}", day, month_label(month))
}
