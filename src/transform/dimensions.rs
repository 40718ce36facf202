//! Dimension extractors
//!
//! Tie-break rules when a key repeats:
//! - songs, artists: the last record in source order wins
//! - users: the event with the greatest `ts` wins, later source order on ties

use crate::error::Result;
use crate::model::{Artist, Song, TimeEntry, User};
use crate::source::{EventRecord, SongRecord};
use crate::timestamp::millis_to_datetime;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Songs dimension, one row per `song_id`, sorted by `song_id`
pub fn extract_songs(records: &[SongRecord]) -> Vec<Song> {
    let mut by_id: BTreeMap<&str, Song> = BTreeMap::new();
    for record in records {
        by_id.insert(
            &record.song_id,
            Song {
                song_id: record.song_id.clone(),
                title: record.title.clone(),
                artist_id: record.artist_id.clone(),
                year: record.year,
                duration: record.duration,
            },
        );
    }
    by_id.into_values().collect()
}

/// Artists dimension, one row per `artist_id`, sorted by `artist_id`
pub fn extract_artists(records: &[SongRecord]) -> Vec<Artist> {
    let mut by_id: BTreeMap<&str, Artist> = BTreeMap::new();
    for record in records {
        by_id.insert(
            &record.artist_id,
            Artist {
                artist_id: record.artist_id.clone(),
                name: record.artist_name.clone(),
                location: record.artist_location.clone(),
                latitude: record.artist_latitude,
                longitude: record.artist_longitude,
            },
        );
    }
    by_id.into_values().collect()
}

/// Users dimension from every event with a user id, sorted by `user_id`
pub fn extract_users(events: &[EventRecord]) -> Vec<User> {
    let mut by_id: BTreeMap<&str, (i64, User)> = BTreeMap::new();

    for event in events {
        let Some(user_id) = event.user_id.as_deref() else {
            continue;
        };

        let newer = by_id
            .get(user_id)
            .map_or(true, |(seen_ts, _)| event.ts >= *seen_ts);
        if newer {
            by_id.insert(
                user_id,
                (
                    event.ts,
                    User {
                        user_id: user_id.to_string(),
                        first_name: event.first_name.clone(),
                        last_name: event.last_name.clone(),
                        gender: event.gender.clone(),
                        level: event.level.clone(),
                    },
                ),
            );
        }
    }

    by_id.into_values().map(|(_, user)| user).collect()
}

/// Time dimension from song-play timestamps, sorted by `start_time`
pub fn extract_time(events: &[EventRecord]) -> Result<Vec<TimeEntry>> {
    let distinct: BTreeSet<i64> = events
        .iter()
        .filter(|event| event.is_song_play())
        .map(|event| event.ts)
        .collect();

    distinct
        .into_iter()
        .map(|ts| Ok(time_entry(millis_to_datetime(ts)?)))
        .collect()
}

/// Calendar decomposition of one timestamp
pub fn time_entry(start_time: DateTime<Utc>) -> TimeEntry {
    TimeEntry {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().number_from_sunday(),
    }
}
