//! Job module
//!
//! Runs the whole pipeline once: read both datasets, build the star schema,
//! write every table and optionally read it back.
//!
//! Tables are written one after another in [`TableName::ALL`] order. There is
//! no transaction across tables; a failed run leaves the tables written so far
//! in place and a full re-run replaces all of them.

mod types;

pub use types::RunReport;

use crate::config::EtlConfig;
use crate::error::Result;
use crate::sink::{ParquetWriterConfig, TableReader, TableWriter};
use crate::storage::{GlobPattern, StorageLocation};
use crate::source::SourceReader;
use crate::transform::StarSchema;
use crate::types::TableName;
use std::time::Instant;
use tracing::info;

/// One ETL run over a config
#[derive(Debug, Clone, Copy)]
pub struct Job<'a> {
    config: &'a EtlConfig,
}

impl<'a> Job<'a> {
    /// Create a job for a config
    pub fn new(config: &'a EtlConfig) -> Self {
        Self { config }
    }

    /// Validate the config, open both locations and run
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;

        let source = StorageLocation::parse(&self.config.source.url, &self.config.storage, false)?;
        let destination =
            StorageLocation::parse(&self.config.destination.url, &self.config.storage, true)?;

        self.run_with(&source, &destination).await
    }

    /// Run against already-opened locations
    pub async fn run_with(
        &self,
        source: &StorageLocation,
        destination: &StorageLocation,
    ) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new(source.display(""), destination.display(""));

        let song_glob = GlobPattern::new(&self.config.source.song_data)?;
        let log_glob = GlobPattern::new(&self.config.source.log_data)?;

        info!(source = %report.source, "Reading source data");
        let reader = SourceReader::new(source, self.config.read.on_malformed);
        let songs = reader.read_songs(&song_glob).await?;
        let events = reader.read_events(&log_glob).await?;
        report.song_data = songs.stats;
        report.log_data = events.stats;

        let schema = StarSchema::build(
            &songs.records,
            &events.records,
            self.config.join.duration_tolerance,
        )?;
        report.matched_songplays = schema.matched_songplays();
        report.unmatched_songplays = schema.songplays.len() - report.matched_songplays;

        info!(destination = %report.destination, "Writing tables");
        let writer = TableWriter::new(
            destination,
            ParquetWriterConfig::from_output(&self.config.output),
        );
        for table in TableName::ALL {
            let stats = match table {
                TableName::Songs => writer.write(&schema.songs).await?,
                TableName::Artists => writer.write(&schema.artists).await?,
                TableName::Users => writer.write(&schema.users).await?,
                TableName::Time => writer.write(&schema.time).await?,
                TableName::Songplays => writer.write(&schema.songplays).await?,
            };
            report.tables.push(stats);
        }

        if self.config.output.verify {
            verify_tables(destination, &schema).await?;
            report.verified = true;
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        info!(
            rows = report.total_rows(),
            skipped = report.skipped_records(),
            duration_ms = report.duration_ms,
            "Run complete"
        );

        Ok(report)
    }
}

/// Read every table back and compare row counts and keys
async fn verify_tables(destination: &StorageLocation, schema: &StarSchema) -> Result<()> {
    let reader = TableReader::new(destination);
    for table in TableName::ALL {
        let snapshot = match table {
            TableName::Songs => reader.verify(&schema.songs).await?,
            TableName::Artists => reader.verify(&schema.artists).await?,
            TableName::Users => reader.verify(&schema.users).await?,
            TableName::Time => reader.verify(&schema.time).await?,
            TableName::Songplays => reader.verify(&schema.songplays).await?,
        };
        info!(table = %table, rows = snapshot.rows, "Verified table");
    }
    Ok(())
}

#[cfg(test)]
mod tests;
