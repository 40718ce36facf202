//! File discovery and JSON Lines decoding

use super::types::{EventRecord, SongRecord, SourceRecord};
use crate::error::{Error, Result, ResultExt};
use crate::storage::{GlobPattern, StorageLocation};
use crate::types::RecordErrorMode;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters for one dataset read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Files matched by the glob
    pub files: usize,
    /// Records decoded successfully
    pub records: usize,
    /// Lines skipped as malformed
    pub skipped: usize,
}

/// Decoded records in source order, with read counters
#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub records: Vec<T>,
    pub stats: ReadStats,
}

/// Reads the two source datasets from one storage location
#[derive(Debug, Clone)]
pub struct SourceReader<'a> {
    location: &'a StorageLocation,
    mode: RecordErrorMode,
}

impl<'a> SourceReader<'a> {
    /// Create a reader over a location
    pub fn new(location: &'a StorageLocation, mode: RecordErrorMode) -> Self {
        Self { location, mode }
    }

    /// Read song metadata records
    pub async fn read_songs(&self, glob: &GlobPattern) -> Result<Dataset<SongRecord>> {
        self.read_all(glob).await
    }

    /// Read event log records
    pub async fn read_events(&self, glob: &GlobPattern) -> Result<Dataset<EventRecord>> {
        self.read_all(glob).await
    }

    /// Read every file matching the glob, in sorted key order
    async fn read_all<T: SourceRecord>(&self, glob: &GlobPattern) -> Result<Dataset<T>> {
        let keys: Vec<String> = self
            .location
            .list(glob.list_prefix())
            .await?
            .into_iter()
            .filter(|key| glob.matches(key))
            .collect();

        if keys.is_empty() {
            return Err(Error::NoInputFiles {
                pattern: self.location.display(glob.as_str()),
            });
        }

        let mut stats = ReadStats {
            files: keys.len(),
            ..ReadStats::default()
        };
        let mut records = Vec::new();

        for key in &keys {
            let body = self
                .location
                .get(key)
                .await
                .with_context(|| format!("Failed to read {}", self.location.display(key)))?;

            let before = records.len();
            match std::str::from_utf8(&body) {
                Ok(text) => {
                    records.extend(decode_lines::<T>(text, key, self.mode, &mut stats)?);
                }
                Err(e) => handle_record_error(
                    Error::malformed(key.as_str(), 0, format!("not valid UTF-8: {e}")),
                    self.mode,
                    &mut stats,
                )?,
            }
            debug!(file = %key, records = records.len() - before, "Decoded file");
        }

        info!(
            pattern = %glob.as_str(),
            files = stats.files,
            records = stats.records,
            skipped = stats.skipped,
            "Read source dataset"
        );

        Ok(Dataset { records, stats })
    }
}

/// Decode a JSON Lines body
///
/// Blank lines are ignored. Each line must hold one object that deserializes
/// into `T` and passes [`SourceRecord::validate`]; anything else is a
/// malformed record, handled according to `mode`.
pub fn decode_lines<T: SourceRecord>(
    body: &str,
    origin: &str,
    mode: RecordErrorMode,
    stats: &mut ReadStats,
) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for (line_num, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let decoded = serde_json::from_str::<T>(line)
            .map_err(|e| e.to_string())
            .and_then(|record| record.validate().map(|()| record));

        match decoded {
            Ok(record) => {
                stats.records += 1;
                records.push(record);
            }
            Err(message) => handle_record_error(
                Error::malformed(origin, line_num + 1, message),
                mode,
                stats,
            )?,
        }
    }

    Ok(records)
}

fn handle_record_error(error: Error, mode: RecordErrorMode, stats: &mut ReadStats) -> Result<()> {
    match mode {
        RecordErrorMode::Fail => Err(error),
        RecordErrorMode::Skip => {
            warn!(error = %error, "Skipping malformed record");
            stats.skipped += 1;
            Ok(())
        }
    }
}
