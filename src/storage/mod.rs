//! Storage module
//!
//! Object storage access shared by the source reader and the sink writer.
//!
//! # Overview
//!
//! This module provides:
//! - `StorageLocation` - a bucket/prefix (or local directory) with list, get,
//!   put and delete operations relative to its root
//! - `GlobPattern` - file discovery globs such as `song_data/*/*/*/*.json`

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::StorageLocation;
