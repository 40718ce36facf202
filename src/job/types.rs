//! Job types
//!
//! The summary produced by one ETL run.

use crate::sink::TableWriteStats;
use crate::source::ReadStats;
use serde::Serialize;

/// Summary of one ETL run, printed as JSON when the run succeeds
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Source location, without credentials
    pub source: String,
    /// Destination location
    pub destination: String,
    /// Song metadata read counters
    pub song_data: ReadStats,
    /// Event log read counters
    pub log_data: ReadStats,
    /// One entry per table, in write order
    pub tables: Vec<TableWriteStats>,
    /// Song plays resolved to a song and artist
    pub matched_songplays: usize,
    /// Song plays with null song and artist ids
    pub unmatched_songplays: usize,
    /// Whether every table was read back and compared
    pub verified: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Create an empty report for a source and destination
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Lines skipped as malformed across both datasets
    pub fn skipped_records(&self) -> usize {
        self.song_data.skipped + self.log_data.skipped
    }

    /// Rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
