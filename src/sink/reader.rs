//! Read-back of written tables

use crate::error::{Error, Result};
use crate::model::{StarTable, NULL_PARTITION};
use crate::storage::StorageLocation;
use crate::types::TableName;
use arrow::array::{Array, ArrayRef, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::BTreeSet;
use tracing::debug;

/// One Parquet file of a table with the partition it was found in
#[derive(Debug, Clone)]
pub struct PartitionFile {
    /// `(column, value)` pairs parsed from the path, outermost first
    pub partition: Vec<(String, Option<String>)>,
    pub batch: RecordBatch,
}

impl PartitionFile {
    /// Value of one partition column; `None` for the null partition or when
    /// the column is absent
    pub fn partition_value(&self, column: &str) -> Option<&str> {
        self.partition
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Row count and primary keys of a written table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSnapshot {
    pub rows: usize,
    pub keys: BTreeSet<String>,
}

/// Reads star tables back from a destination
#[derive(Debug, Clone, Copy)]
pub struct TableReader<'a> {
    location: &'a StorageLocation,
}

impl<'a> TableReader<'a> {
    pub fn new(location: &'a StorageLocation) -> Self {
        Self { location }
    }

    /// Read every Parquet file of a table, sorted by path
    pub async fn read(&self, table: TableName) -> Result<Vec<PartitionFile>> {
        let dir = table.directory();
        let mut files = Vec::new();

        for segments in self.location.list_segments(&dir).await? {
            let Some((file_name, rest)) = segments.split_last() else {
                continue;
            };
            let Some((_, middle)) = rest.split_first() else {
                continue;
            };
            if !file_name.ends_with(".parquet") {
                continue;
            }

            let partition = middle
                .iter()
                .map(|segment| parse_partition_segment(table, segment))
                .collect::<Result<Vec<_>>>()?;

            let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
            let data = self.location.get_parts(&refs).await?;
            let batch = decode_parquet(data)?;

            debug!(table = %table, path = %refs.join("/"), rows = batch.num_rows(), "Read partition");
            files.push(PartitionFile { partition, batch });
        }

        Ok(files)
    }

    /// Count rows and collect primary keys of a table
    pub async fn snapshot(&self, table: TableName) -> Result<TableSnapshot> {
        let key_column = table.key_column();
        let mut snapshot = TableSnapshot::default();

        for file in self.read(table).await? {
            snapshot.rows += file.batch.num_rows();
            let column = file.batch.column_by_name(key_column).ok_or_else(|| {
                Error::verification(table.as_str(), format!("Missing key column '{key_column}'"))
            })?;
            collect_keys(table, column, &mut snapshot.keys)?;
        }

        Ok(snapshot)
    }

    /// Compare a written table with the rows it was written from
    pub async fn verify<T: StarTable>(&self, rows: &[T]) -> Result<TableSnapshot> {
        let table = T::NAME;
        let snapshot = self.snapshot(table).await?;

        if snapshot.rows != rows.len() {
            return Err(Error::verification(
                table.as_str(),
                format!("expected {} rows, found {}", rows.len(), snapshot.rows),
            ));
        }

        let expected: BTreeSet<String> = rows.iter().map(StarTable::key).collect();
        if snapshot.keys != expected {
            let missing = expected.difference(&snapshot.keys).count();
            let unexpected = snapshot.keys.difference(&expected).count();
            return Err(Error::verification(
                table.as_str(),
                format!("key mismatch: {missing} missing, {unexpected} unexpected"),
            ));
        }

        Ok(snapshot)
    }
}

/// Parse a `col=value` directory name
fn parse_partition_segment(table: TableName, segment: &str) -> Result<(String, Option<String>)> {
    let (column, value) = segment.split_once('=').ok_or_else(|| {
        Error::verification(
            table.as_str(),
            format!("Unexpected directory '{segment}' in table output"),
        )
    })?;

    if !table.partition_columns().contains(&column) {
        return Err(Error::verification(
            table.as_str(),
            format!("'{column}' is not a partition column"),
        ));
    }

    let value = (value != NULL_PARTITION).then(|| value.to_string());
    Ok((column.to_string(), value))
}

/// Decode one Parquet file into a single batch
fn decode_parquet(data: bytes::Bytes) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Render key values the same way [`StarTable::key`] does
fn collect_keys(table: TableName, column: &ArrayRef, keys: &mut BTreeSet<String>) -> Result<()> {
    if column.null_count() > 0 {
        return Err(Error::verification(table.as_str(), "Null primary key"));
    }

    match column.data_type() {
        DataType::Utf8 => {
            let array = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::verification(table.as_str(), "Expected string keys"))?;
            keys.extend(array.iter().flatten().map(str::to_string));
        }
        DataType::Int64 => {
            let array = column
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| Error::verification(table.as_str(), "Expected integer keys"))?;
            keys.extend(array.iter().flatten().map(|v| v.to_string()));
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let array = column
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| Error::verification(table.as_str(), "Expected timestamp keys"))?;
            keys.extend(array.iter().flatten().map(|v| v.to_string()));
        }
        other => {
            return Err(Error::verification(
                table.as_str(),
                format!("Unsupported key type {other}"),
            ));
        }
    }

    Ok(())
}
