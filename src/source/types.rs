//! Source record types
//!
//! Field names follow the JSON produced by the upstream systems, hence the
//! mix of snake_case (song metadata) and camelCase (event logs).

use crate::timestamp::millis_to_datetime;
use crate::types::OptionStringExt;
use serde::{Deserialize, Deserializer, Serialize};

/// The `page` value of a song-play event
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// A decoded source row that can reject itself after parsing
pub trait SourceRecord: serde::de::DeserializeOwned {
    /// Check constraints serde cannot express; the message becomes part of a
    /// malformed-record error
    fn validate(&self) -> std::result::Result<(), String>;
}

// ============================================================================
// Song Metadata
// ============================================================================

/// One song metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub num_songs: Option<i64>,
}

impl SourceRecord for SongRecord {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.song_id.is_empty() {
            return Err("song_id is empty".to_string());
        }
        if self.artist_id.is_empty() {
            return Err("artist_id is empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Event Log
// ============================================================================

/// One user activity event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Absent, null and `""` all mean a logged-out user
    #[serde(default, deserialize_with = "user_id_from_json")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub ts: i64,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub item_in_session: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub page: String,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub registration: Option<f64>,
}

impl EventRecord {
    /// Whether this event is a song play
    pub fn is_song_play(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }
}

impl SourceRecord for EventRecord {
    fn validate(&self) -> std::result::Result<(), String> {
        millis_to_datetime(self.ts)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Accept `"39"`, `39`, `""` or null
fn user_id_from_json<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawId::Text(s)) => s.trim().to_string().none_if_empty(),
        Some(RawId::Int(n)) => Some(n.to_string()),
        None => None,
    })
}
