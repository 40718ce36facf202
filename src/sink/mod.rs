//! Sink module
//!
//! Writes the star schema as Hive-style partitioned Parquet and reads it back.
//!
//! # Overview
//!
//! This module provides:
//! - `TableWriter` - replaces a table directory with one Parquet file per
//!   partition (`<table>_table/<col>=<value>/.../part-00000.parquet`)
//! - `ParquetWriterConfig` - compression, row group size, dictionary and
//!   statistics settings
//! - `TableReader` - reads a table back, rebuilding partition values from the
//!   path, and verifies row counts and keys

mod reader;
mod writer;

pub use reader::{PartitionFile, TableReader, TableSnapshot};
pub use writer::{
    encode_parquet, partition_segments, ParquetWriterConfig, TableWriteStats, TableWriter,
    PART_FILE,
};
