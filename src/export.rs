// src/export.rs
//! CSV output: one row per selected record, `Date,Title,Description,Source`.

use anyhow::{Context, Result};
use chrono::Month;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::calendar::date_label;
use crate::relevance::ScoredRecord;

pub const HEADER: [&str; 4] = ["Date", "Title", "Description", "Source"];
pub const MAX_DESCRIPTION_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

/// One CSV line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub date: String,
    pub title: String,
    pub description: String,
    pub source: String,
}

impl DayRow {
    pub fn from_record(month: Month, day: u32, rec: &ScoredRecord) -> Self {
        Self {
            date: date_label(month, day),
            title: rec.title().to_string(),
            description: truncate_description(rec.description()),
            source: rec.source_url().to_string(),
        }
    }

    fn cells(&self) -> [&str; 4] {
        [&self.date, &self.title, &self.description, &self.source]
    }
}

/// Cap at `MAX_DESCRIPTION_CHARS`, replacing the tail with "..." when cut.
pub fn truncate_description(desc: &str) -> String {
    if desc.chars().count() <= MAX_DESCRIPTION_CHARS {
        return desc.to_string();
    }
    let keep = MAX_DESCRIPTION_CHARS - ELLIPSIS.len();
    let mut out: String = desc.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row (CRLF terminated).
pub fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Flatten per-day selections into rows, days ascending.
pub fn rows_for_month(month: Month, per_day: &BTreeMap<u32, Vec<ScoredRecord>>) -> Vec<DayRow> {
    per_day
        .iter()
        .flat_map(|(&day, recs)| recs.iter().map(move |r| DayRow::from_record(month, day, r)))
        .collect()
}

/// Header + rows to any writer.
pub fn write_csv<W: Write>(w: &mut W, rows: &[DayRow]) -> io::Result<()> {
    write_row(w, &HEADER)?;
    for r in rows {
        write_row(w, &r.cells())?;
    }
    Ok(())
}

/// Write the month to `path`. Returns the number of data rows written.
pub fn save_csv(
    path: &Path,
    month: Month,
    per_day: &BTreeMap<u32, Vec<ScoredRecord>>,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let rows = rows_for_month(month, per_day);
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_csv(&mut w, &rows).with_context(|| format!("writing {}", path.display()))?;
    w.flush().with_context(|| format!("flushing {}", path.display()))?;
    info!(target: "export", path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(rows.len())
}
