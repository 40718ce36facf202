//! Source reader module
//!
//! Loads song metadata and user activity events from line-delimited JSON
//! files in object storage.
//!
//! # Overview
//!
//! The source module provides:
//! - `SongRecord` / `EventRecord` - typed source rows
//! - `SourceReader` - glob discovery, fetching and decoding
//! - `decode_lines` - JSON Lines decoding with fail-fast or skip-and-count
//!
//! Records keep the order they were read in: object keys sorted
//! lexicographically, then line number. Every tie-break downstream relies on
//! that order.

mod reader;
mod types;

pub use reader::{decode_lines, Dataset, ReadStats, SourceReader};
pub use types::{EventRecord, SongRecord, SourceRecord, NEXT_SONG_PAGE};

#[cfg(test)]
mod tests;
