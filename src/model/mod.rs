//! Star schema tables
//!
//! Row types for the four dimensions and the fact table, and their mapping
//! to Arrow record batches.
//!
//! # Overview
//!
//! Every table implements [`StarTable`], which tells the sink how to split
//! rows into partitions and how to build the batch stored in each file.
//! Partition columns live in the directory path only, so they are not part of
//! [`StarTable::file_schema`].

mod tables;

pub use tables::{Artist, Song, SongPlay, TimeEntry, User};

use crate::error::Result;
use crate::types::TableName;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// Partition value written for nulls
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// A table of the star schema
pub trait StarTable {
    /// Which table this is
    const NAME: TableName;

    /// Schema of the columns stored inside each Parquet file
    fn file_schema() -> SchemaRef;

    /// Partition values in [`TableName::partition_columns`] order; `None` is
    /// written as [`NULL_PARTITION`]
    fn partition_values(&self) -> Vec<Option<String>>;

    /// Primary key rendered as text, matching what the table reader extracts
    fn key(&self) -> String;

    /// Build one batch of file columns
    fn to_batch(rows: &[&Self]) -> Result<RecordBatch>;
}
