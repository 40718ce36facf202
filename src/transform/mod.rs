//! Transform module
//!
//! Reshapes source records into the star schema.
//!
//! # Overview
//!
//! - `extract_songs`, `extract_artists`, `extract_users`, `extract_time` -
//!   dimension extractors with fixed tie-break rules
//! - `build_songplays` - the fact builder, joining song plays to songs and
//!   artists through a `SongLookup`
//! - `StarSchema` - all five tables from one pass
//!
//! Every output is sorted (dimensions by key, facts by `songplay_id`), so the
//! same input always produces the same tables.

mod dimensions;
mod facts;

pub use dimensions::{extract_artists, extract_songs, extract_time, extract_users, time_entry};
pub use facts::{build_songplays, SongLookup};

use crate::error::Result;
use crate::model::{Artist, Song, SongPlay, TimeEntry, User};
use crate::source::{EventRecord, SongRecord};
use tracing::info;

/// The complete set of output tables
#[derive(Debug, Clone, Default)]
pub struct StarSchema {
    pub songs: Vec<Song>,
    pub artists: Vec<Artist>,
    pub users: Vec<User>,
    pub time: Vec<TimeEntry>,
    pub songplays: Vec<SongPlay>,
}

impl StarSchema {
    /// Build every table from the two source datasets
    pub fn build(
        song_records: &[SongRecord],
        events: &[EventRecord],
        duration_tolerance: f64,
    ) -> Result<Self> {
        let songs = extract_songs(song_records);
        let artists = extract_artists(song_records);
        info!(
            songs = songs.len(),
            artists = artists.len(),
            "Extracted song dimensions"
        );

        let users = extract_users(events);
        let time = extract_time(events)?;
        info!(
            users = users.len(),
            time = time.len(),
            "Extracted event dimensions"
        );

        let lookup = SongLookup::new(song_records, duration_tolerance);
        let songplays = build_songplays(events, &lookup)?;

        let schema = Self {
            songs,
            artists,
            users,
            time,
            songplays,
        };
        info!(
            songplays = schema.songplays.len(),
            matched = schema.matched_songplays(),
            "Built songplays fact table"
        );
        Ok(schema)
    }

    /// Number of song plays resolved to a song and artist
    pub fn matched_songplays(&self) -> usize {
        self.songplays
            .iter()
            .filter(|play| play.song_id.is_some())
            .count()
    }
}
