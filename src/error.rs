//! Error types for songplay-etl
//!
//! This module defines the error hierarchy for the whole job.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for songplay-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("No input files matched '{pattern}'")]
    NoInputFiles { pattern: String },

    #[error("Invalid object path segment '{segment}': {message}")]
    InvalidPath { segment: String, message: String },

    // ============================================================================
    // Record Errors
    // ============================================================================
    #[error("Malformed record in {location} at line {line}: {message}")]
    MalformedRecord {
        location: String,
        line: usize,
        message: String,
    },

    #[error("Invalid timestamp {ts}ms")]
    InvalidTimestamp { ts: i64 },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Verification failed for table '{table}': {message}")]
    Verification { table: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(location: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            location: location.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid glob error
    pub fn glob(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGlob {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid path segment error
    pub fn invalid_path(segment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Verification {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a single bad record rather than the environment.
    ///
    /// Only these errors may be skipped under [`RecordErrorMode::Skip`](crate::types::RecordErrorMode).
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedRecord { .. } | Error::InvalidTimestamp { .. }
        )
    }
}

/// Result type alias for songplay-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("source.url");
        assert_eq!(err.to_string(), "Missing required config field: source.url");

        let err = Error::malformed("log_data/2018/11/a.json", 3, "expected value");
        assert_eq!(
            err.to_string(),
            "Malformed record in log_data/2018/11/a.json at line 3: expected value"
        );
    }

    #[test]
    fn test_is_record_error() {
        assert!(Error::malformed("a.json", 1, "bad").is_record_error());
        assert!(Error::InvalidTimestamp { ts: i64::MAX }.is_record_error());

        assert!(!Error::config("test").is_record_error());
        assert!(!Error::output("disk full").is_record_error());
        assert!(!Error::NoInputFiles {
            pattern: "*.json".to_string()
        }
        .is_record_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
