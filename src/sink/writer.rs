//! Parquet encoding and partitioned table writes

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::model::{StarTable, NULL_PARTITION};
use crate::storage::StorageLocation;
use crate::types::{OutputCompression, TableName};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// File name used inside every partition directory
pub const PART_FILE: &str = "part-00000.parquet";

/// Configuration for Parquet encoding
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get compression codec
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the job's output settings
    #[must_use]
    pub fn from_output(output: &OutputConfig) -> Self {
        let config = Self::new()
            .with_row_group_size(output.row_group_size)
            .with_dictionary(output.dictionary)
            .with_statistics(output.statistics);
        match output.compression {
            OutputCompression::Snappy => config,
            OutputCompression::Zstd => config.zstd(),
            OutputCompression::Gzip => config.gzip(),
            OutputCompression::None => config.uncompressed(),
        }
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Use GZIP compression
    #[must_use]
    pub fn gzip(mut self) -> Self {
        self.compression = Compression::GZIP(parquet::basic::GzipLevel::default());
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Encode one batch as a complete Parquet file in memory
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut buf = Vec::new();
    let props = config.build_properties();

    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;

    writer
        .close()
        .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;

    Ok(Bytes::from(buf))
}

/// `col=value` directory names for one partition
pub fn partition_segments(columns: &[&str], values: &[Option<String>]) -> Vec<String> {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| format!("{column}={}", value.as_deref().unwrap_or(NULL_PARTITION)))
        .collect()
}

/// Result of writing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableWriteStats {
    pub table: TableName,
    /// Rows written
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
    /// Objects removed from the previous run
    pub removed: usize,
}

/// Writes star tables under a destination root, replacing earlier output
#[derive(Debug, Clone)]
pub struct TableWriter<'a> {
    location: &'a StorageLocation,
    config: ParquetWriterConfig,
}

impl<'a> TableWriter<'a> {
    /// Create a writer over a destination
    pub fn new(location: &'a StorageLocation, config: ParquetWriterConfig) -> Self {
        Self { location, config }
    }

    /// Replace the table's directory with one file per partition
    ///
    /// An empty table is written as a single empty file at the table root so
    /// the schema stays discoverable.
    pub async fn write<T: StarTable>(&self, rows: &[T]) -> Result<TableWriteStats> {
        let table = T::NAME;
        let dir = table.directory();

        let removed = self.location.delete_prefix(&dir).await?;
        if removed > 0 {
            debug!(table = %table, removed, "Removed previous output");
        }

        let mut partitions: BTreeMap<Vec<Option<String>>, Vec<&T>> = BTreeMap::new();
        for row in rows {
            partitions.entry(row.partition_values()).or_default().push(row);
        }
        if partitions.is_empty() {
            partitions.insert(Vec::new(), Vec::new());
        }

        let mut files = 0;
        for (values, members) in &partitions {
            let batch = T::to_batch(members)?;
            let data = encode_parquet(&batch, &self.config)?;

            let mut segments = vec![dir.clone()];
            segments.extend(partition_segments(table.partition_columns(), values));
            segments.push(PART_FILE.to_string());
            let refs: Vec<&str> = segments.iter().map(String::as_str).collect();

            let written = self.location.put_parts(&refs, data).await?;
            debug!(table = %table, path = %written, rows = members.len(), "Wrote partition");
            files += 1;
        }

        info!(table = %table, rows = rows.len(), files, "Wrote table");

        Ok(TableWriteStats {
            table,
            rows: rows.len(),
            files,
            removed,
        })
    }
}
