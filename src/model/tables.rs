//! Row types and Arrow conversion

use super::StarTable;
use crate::error::Result;
use crate::types::TableName;
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Utc};
use std::sync::Arc;

fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

fn timestamps<'a>(values: impl Iterator<Item = &'a DateTime<Utc>>) -> ArrayRef {
    let array: TimestampMicrosecondArray = values.map(|t| Some(t.timestamp_micros())).collect();
    Arc::new(array.with_timezone("UTC"))
}

fn strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(values.collect::<StringArray>())
}

// ============================================================================
// Songs
// ============================================================================

/// Song dimension row
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

impl StarTable for Song {
    const NAME: TableName = TableName::Songs;

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![
            self.year.map(|y| y.to_string()),
            Some(self.artist_id.clone()),
        ]
    }

    fn key(&self) -> String {
        self.song_id.clone()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows.iter().map(|r| Some(r.song_id.as_str()))),
            strings(rows.iter().map(|r| Some(r.title.as_str()))),
            Arc::new(rows.iter().map(|r| r.duration).collect::<Float64Array>()) as ArrayRef,
        ];
        Ok(RecordBatch::try_new(Self::file_schema(), columns)?)
    }
}

// ============================================================================
// Artists
// ============================================================================

/// Artist dimension row
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StarTable for Artist {
    const NAME: TableName = TableName::Artists;

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn key(&self) -> String {
        self.artist_id.clone()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows.iter().map(|r| Some(r.artist_id.as_str()))),
            strings(rows.iter().map(|r| r.name.as_deref())),
            strings(rows.iter().map(|r| r.location.as_deref())),
            Arc::new(rows.iter().map(|r| r.latitude).collect::<Float64Array>()) as ArrayRef,
            Arc::new(rows.iter().map(|r| r.longitude).collect::<Float64Array>()) as ArrayRef,
        ];
        Ok(RecordBatch::try_new(Self::file_schema(), columns)?)
    }
}

// ============================================================================
// Users
// ============================================================================

/// User dimension row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl StarTable for User {
    const NAME: TableName = TableName::Users;

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn key(&self) -> String {
        self.user_id.clone()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let columns = vec![
            strings(rows.iter().map(|r| Some(r.user_id.as_str()))),
            strings(rows.iter().map(|r| r.first_name.as_deref())),
            strings(rows.iter().map(|r| r.last_name.as_deref())),
            strings(rows.iter().map(|r| r.gender.as_deref())),
            strings(rows.iter().map(|r| r.level.as_deref())),
        ];
        Ok(RecordBatch::try_new(Self::file_schema(), columns)?)
    }
}

// ============================================================================
// Time
// ============================================================================

/// Time dimension row
///
/// `weekday` runs 1 (Sunday) to 7 (Saturday); `week` is the ISO-8601 week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl StarTable for TimeEntry {
    const NAME: TableName = TableName::Time;

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", timestamp_type(), false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year.to_string()), Some(self.month.to_string())]
    }

    fn key(&self) -> String {
        self.start_time.timestamp_micros().to_string()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let int = |f: fn(&TimeEntry) -> u32| -> ArrayRef {
            Arc::new(
                rows.iter()
                    .map(|r| Some(f(r) as i32))
                    .collect::<Int32Array>(),
            )
        };
        let columns = vec![
            timestamps(rows.iter().map(|r| &r.start_time)),
            int(|r| r.hour),
            int(|r| r.day),
            int(|r| r.week),
            int(|r| r.weekday),
        ];
        Ok(RecordBatch::try_new(Self::file_schema(), columns)?)
    }
}

// ============================================================================
// Song Plays
// ============================================================================

/// Fact table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPlay {
    pub songplay_id: i64,
    pub start_time: DateTime<Utc>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongPlay {
    /// Partition year derived from `start_time`
    pub fn year(&self) -> i32 {
        self.start_time.year()
    }

    /// Partition month derived from `start_time`
    pub fn month(&self) -> u32 {
        self.start_time.month()
    }
}

impl StarTable for SongPlay {
    const NAME: TableName = TableName::Songplays;

    fn file_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", timestamp_type(), false),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![Some(self.year().to_string()), Some(self.month().to_string())]
    }

    fn key(&self) -> String {
        self.songplay_id.to_string()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        let columns = vec![
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.songplay_id))
                    .collect::<Int64Array>(),
            ) as ArrayRef,
            timestamps(rows.iter().map(|r| &r.start_time)),
            strings(rows.iter().map(|r| r.user_id.as_deref())),
            strings(rows.iter().map(|r| r.level.as_deref())),
            strings(rows.iter().map(|r| r.song_id.as_deref())),
            strings(rows.iter().map(|r| r.artist_id.as_deref())),
            Arc::new(rows.iter().map(|r| r.session_id).collect::<Int64Array>()) as ArrayRef,
            strings(rows.iter().map(|r| r.location.as_deref())),
            strings(rows.iter().map(|r| r.user_agent.as_deref())),
        ];
        Ok(RecordBatch::try_new(Self::file_schema(), columns)?)
    }
}
