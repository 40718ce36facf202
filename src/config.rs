//! Job configuration
//!
//! This module contains the configuration structures for an ETL run. A config
//! is loaded from YAML, optionally overlaid with environment variables, and
//! then passed by reference to every stage of the job.

use crate::error::{Error, Result};
use crate::types::{OutputCompression, RecordErrorMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration for one ETL run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Object storage credentials and endpoint
    #[serde(default)]
    pub storage: StorageConfig,

    /// Where the JSON source files live
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the star-schema tables are written
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Record decoding behavior
    #[serde(default)]
    pub read: ReadConfig,

    /// Fact table join behavior
    #[serde(default)]
    pub join: JoinConfig,

    /// Parquet output settings
    #[serde(default)]
    pub output: OutputConfig,
}

// ============================================================================
// Storage
// ============================================================================

/// Credentials and endpoint for S3-compatible storage
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Access key id
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<String>,

    /// Bucket region
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (R2, MinIO, LocalStack)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Allow plain HTTP endpoints
    #[serde(default)]
    pub allow_http: bool,
}

// Secrets stay out of logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

// ============================================================================
// Source / Destination
// ============================================================================

/// Source location and file-discovery globs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the input data
    #[serde(default)]
    pub url: String,

    /// Glob for song metadata files, relative to `url`
    #[serde(default = "default_song_data")]
    pub song_data: String,

    /// Glob for event log files, relative to `url`
    #[serde(default = "default_log_data")]
    pub log_data: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            song_data: default_song_data(),
            log_data: default_log_data(),
        }
    }
}

fn default_song_data() -> String {
    "song_data/*/*/*/*.json".to_string()
}

fn default_log_data() -> String {
    "log_data/*/*/*.json".to_string()
}

/// Output root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Base URL the five table directories are written under
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// Read / Join / Output
// ============================================================================

/// Record decoding settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadConfig {
    /// Handling of lines that fail to decode
    #[serde(default)]
    pub on_malformed: RecordErrorMode,
}

/// Fact table join settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Maximum absolute difference between event length and song duration
    /// for a match. Zero means exact equality.
    #[serde(default)]
    pub duration_tolerance: f64,
}

/// Parquet output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Compression codec
    #[serde(default)]
    pub compression: OutputCompression,

    /// Maximum rows per row group
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Dictionary-encode columns
    #[serde(default = "default_true")]
    pub dictionary: bool,

    /// Write column statistics
    #[serde(default = "default_true")]
    pub statistics: bool,

    /// Read every table back after writing and compare keys
    #[serde(default)]
    pub verify: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: OutputCompression::default(),
            row_group_size: default_row_group_size(),
            dictionary: true,
            statistics: true,
            verify: false,
        }
    }
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Loading
// ============================================================================

impl EtlConfig {
    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overlay environment variables on top of the loaded values
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup; empty values are ignored
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("AWS_ACCESS_KEY_ID") {
            self.storage.access_key_id = Some(v);
        }
        if let Some(v) = get("AWS_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = Some(v);
        }
        if let Some(v) = get("AWS_SESSION_TOKEN") {
            self.storage.session_token = Some(v);
        }
        if let Some(v) = get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION")) {
            self.storage.region = Some(v);
        }
        if let Some(v) = get("AWS_ENDPOINT") {
            self.storage.endpoint = Some(v);
        }
        if let Some(v) = get("SONGPLAY_SOURCE_URL") {
            self.source.url = v;
        }
        if let Some(v) = get("SONGPLAY_DESTINATION_URL") {
            self.destination.url = v;
        }
    }

    /// Check the config is complete and consistent
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            return Err(Error::missing_field("source.url"));
        }
        if self.destination.url.trim().is_empty() {
            return Err(Error::missing_field("destination.url"));
        }
        if self.source.song_data.trim().is_empty() {
            return Err(Error::missing_field("source.song_data"));
        }
        if self.source.log_data.trim().is_empty() {
            return Err(Error::missing_field("source.log_data"));
        }

        let tolerance = self.join.duration_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::invalid_value(
                "join.duration_tolerance",
                format!("must be a finite non-negative number, got {tolerance}"),
            ));
        }

        if self.output.row_group_size == 0 {
            return Err(Error::invalid_value(
                "output.row_group_size",
                "must be greater than zero",
            ));
        }

        match (
            &self.storage.access_key_id,
            &self.storage.secret_access_key,
        ) {
            (Some(_), None) => Err(Error::missing_field("storage.secret_access_key")),
            (None, Some(_)) => Err(Error::missing_field("storage.access_key_id")),
            _ => Ok(()),
        }
    }
}
