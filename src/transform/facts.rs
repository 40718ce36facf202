//! Fact builder

use crate::error::Result;
use crate::model::SongPlay;
use crate::source::{EventRecord, SongRecord};
use crate::timestamp::millis_to_datetime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    song_id: &'a str,
    artist_id: &'a str,
    duration: Option<f64>,
}

/// Index of songs by (title, artist name) for resolving song plays
///
/// Candidates under one key are kept sorted by (song_id, artist_id), so when
/// several match, the smallest pair wins.
#[derive(Debug, Clone)]
pub struct SongLookup<'a> {
    /// title -> artist name -> candidates
    index: HashMap<&'a str, HashMap<&'a str, Vec<Candidate<'a>>>>,
    tolerance: f64,
}

impl<'a> SongLookup<'a> {
    /// Index song metadata records by their own title and artist name
    ///
    /// Each record keeps the artist name it was published with, so one artist
    /// id listed under several spellings matches under all of them. Records
    /// without an artist name cannot match and are left out.
    pub fn new(records: &'a [SongRecord], tolerance: f64) -> Self {
        let mut index: HashMap<&'a str, HashMap<&'a str, Vec<Candidate<'a>>>> = HashMap::new();
        for record in records {
            let Some(name) = record.artist_name.as_deref() else {
                continue;
            };
            index
                .entry(record.title.as_str())
                .or_default()
                .entry(name)
                .or_default()
                .push(Candidate {
                    song_id: &record.song_id,
                    artist_id: &record.artist_id,
                    duration: record.duration,
                });
        }

        for candidates in index.values_mut().flat_map(HashMap::values_mut) {
            candidates.sort_by(|a, b| (a.song_id, a.artist_id).cmp(&(b.song_id, b.artist_id)));
            candidates.dedup_by(|a, b| {
                (a.song_id, a.artist_id, a.duration) == (b.song_id, b.artist_id, b.duration)
            });
        }

        Self { index, tolerance }
    }

    /// Resolve a play to `(song_id, artist_id)`
    ///
    /// Any missing input is a miss, as is a duration further than the
    /// tolerance from the event length.
    pub fn resolve(
        &self,
        title: Option<&str>,
        artist: Option<&str>,
        length: Option<f64>,
    ) -> Option<(&'a str, &'a str)> {
        let (title, artist, length) = (title?, artist?, length?);
        self.index
            .get(title)?
            .get(artist)?
            .iter()
            .find(|candidate| {
                candidate
                    .duration
                    .is_some_and(|duration| (duration - length).abs() <= self.tolerance)
            })
            .map(|candidate| (candidate.song_id, candidate.artist_id))
    }

    /// Number of indexed (title, artist) keys
    pub fn len(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    /// Whether nothing can match
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Build the songplays fact table, one row per `NextSong` event
///
/// Ids are dense from 0, assigned after sorting plays by
/// (ts, session id, item in session, source order).
pub fn build_songplays(events: &[EventRecord], lookup: &SongLookup<'_>) -> Result<Vec<SongPlay>> {
    let mut plays: Vec<(usize, &EventRecord)> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.is_song_play())
        .collect();

    plays.sort_by_key(|(position, event)| {
        (event.ts, event.session_id, event.item_in_session, *position)
    });

    let mut songplay_id = 0_i64;
    plays
        .into_iter()
        .map(|(_, event)| {
            let start_time = millis_to_datetime(event.ts)?;
            let resolved = lookup.resolve(
                event.song.as_deref(),
                event.artist.as_deref(),
                event.length,
            );

            let play = SongPlay {
                songplay_id,
                start_time,
                user_id: event.user_id.clone(),
                level: event.level.clone(),
                song_id: resolved.map(|(song_id, _)| song_id.to_string()),
                artist_id: resolved.map(|(_, artist_id)| artist_id.to_string()),
                session_id: event.session_id,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
            };
            songplay_id += 1;
            Ok(play)
        })
        .collect()
}
