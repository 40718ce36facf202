//! Epoch-millisecond conversion shared by the time dimension and the fact table

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Convert milliseconds since the Unix epoch to a UTC timestamp
pub fn millis_to_datetime(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts).ok_or(Error::InvalidTimestamp { ts })
}
