//! Common types used throughout songplay-etl
//!
//! This module contains shared enums and small utilities used across
//! multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Table Names
// ============================================================================

/// The five tables of the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl TableName {
    /// All tables in write order
    pub const ALL: [TableName; 5] = [
        TableName::Songs,
        TableName::Artists,
        TableName::Users,
        TableName::Time,
        TableName::Songplays,
    ];

    /// Short name used in logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Songs => "songs",
            TableName::Artists => "artists",
            TableName::Users => "users",
            TableName::Time => "time",
            TableName::Songplays => "songplays",
        }
    }

    /// Directory name under the destination root
    pub fn directory(self) -> String {
        format!("{}_table", self.as_str())
    }

    /// Partition columns, outermost first
    pub fn partition_columns(self) -> &'static [&'static str] {
        match self {
            TableName::Songs => &["year", "artist_id"],
            TableName::Time | TableName::Songplays => &["year", "month"],
            TableName::Artists | TableName::Users => &[],
        }
    }

    /// Primary key column
    pub fn key_column(self) -> &'static str {
        match self {
            TableName::Songs => "song_id",
            TableName::Artists => "artist_id",
            TableName::Users => "user_id",
            TableName::Time => "start_time",
            TableName::Songplays => "songplay_id",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Record Error Mode
// ============================================================================

/// What to do with a source line that cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorMode {
    /// Abort the run on the first malformed record
    #[default]
    Fail,
    /// Log, count and skip malformed records
    Skip,
}

// ============================================================================
// Output Compression
// ============================================================================

/// Parquet compression codec for output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCompression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    None,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_directories() {
        assert_eq!(TableName::Songs.directory(), "songs_table");
        assert_eq!(TableName::Songplays.directory(), "songplays_table");
        assert_eq!(TableName::Time.to_string(), "time");
    }

    #[test]
    fn test_partition_columns() {
        assert_eq!(TableName::Songs.partition_columns(), &["year", "artist_id"]);
        assert_eq!(TableName::Time.partition_columns(), &["year", "month"]);
        assert_eq!(TableName::Songplays.partition_columns(), &["year", "month"]);
        assert!(TableName::Artists.partition_columns().is_empty());
        assert!(TableName::Users.partition_columns().is_empty());
    }

    #[test]
    fn test_record_error_mode_serde() {
        let mode: RecordErrorMode = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(mode, RecordErrorMode::Skip);
        assert_eq!(RecordErrorMode::default(), RecordErrorMode::Fail);

        let json = serde_json::to_string(&OutputCompression::Zstd).unwrap();
        assert_eq!(json, "\"zstd\"");
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
