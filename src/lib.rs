// src/lib.rs
// Public library surface for the binary and integration tests.

// Balanced selection engine (pure)
pub mod relevance;
pub mod selection;

// Collaborators around the engine: page ingest, calendar, CSV, config, runner
pub mod calendar;
pub mod config;
pub mod export;
pub mod ingest;
pub mod runner;

// ---- Re-exports for stable public API ----
pub use crate::ingest::types::RawRecord;
pub use crate::relevance::{RelevanceEngine, ScoredRecord};
pub use crate::selection::{select, select_with, SelectionQuery, SelectionStrategy};
