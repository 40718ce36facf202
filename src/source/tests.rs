//! Tests for source module

use super::*;
use crate::error::Error;
use crate::storage::{GlobPattern, StorageLocation};
use crate::types::RecordErrorMode;
use bytes::Bytes;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SONG_LINE: &str = r#"{"num_songs": 1, "artist_id": "ARJIE2Y1187B994AB7", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Line Renaud", "song_id": "SOUPIRU12A6D4FA1E1", "title": "Der Kleine Dompfaff", "duration": 152.92036, "year": 0}"#;

const EVENT_LINE: &str = r#"{"artist":"Pavement","auth":"Logged In","firstName":"Sylvie","gender":"F","itemInSession":0,"lastName":"Cruz","length":99.16036,"level":"free","location":"Washington-Arlington-Alexandria, DC-VA-MD-WV","method":"PUT","page":"NextSong","registration":1540266185796.0,"sessionId":345,"song":"Mercy:The Laundromat","status":200,"ts":1541990258796,"userAgent":"Mozilla/5.0","userId":"10"}"#;

const HOME_LINE: &str = r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":0,"lastName":null,"length":null,"level":"free","location":null,"method":"GET","page":"Home","registration":null,"sessionId":52,"song":null,"status":200,"ts":1541207073796,"userAgent":null,"userId":""}"#;

// ============================================================================
// Record Decoding Tests
// ============================================================================

#[test]
fn test_decode_song_record() {
    let mut stats = ReadStats::default();
    let songs: Vec<SongRecord> =
        decode_lines(SONG_LINE, "a.json", RecordErrorMode::Fail, &mut stats).unwrap();

    assert_eq!(songs.len(), 1);
    let song = &songs[0];
    assert_eq!(song.song_id, "SOUPIRU12A6D4FA1E1");
    assert_eq!(song.artist_name.as_deref(), Some("Line Renaud"));
    assert_eq!(song.artist_location.as_deref(), Some(""));
    assert_eq!(song.artist_latitude, None);
    assert_eq!(song.year, Some(0));
    assert_eq!(song.duration, Some(152.920_36));
    assert_eq!(stats.records, 1);
}

#[test]
fn test_decode_event_record() {
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(EVENT_LINE, "e.json", RecordErrorMode::Fail, &mut stats).unwrap();

    let event = &events[0];
    assert_eq!(event.user_id.as_deref(), Some("10"));
    assert_eq!(event.first_name.as_deref(), Some("Sylvie"));
    assert_eq!(event.session_id, Some(345));
    assert_eq!(event.ts, 1_541_990_258_796);
    assert!(event.is_song_play());
}

#[test]
fn test_empty_user_id_is_absent() {
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(HOME_LINE, "e.json", RecordErrorMode::Fail, &mut stats).unwrap();
    assert_eq!(events[0].user_id, None);
    assert!(!events[0].is_song_play());
}

#[test]
fn test_numeric_user_id() {
    let line = r#"{"userId": 26, "ts": 1541990795796, "page": "NextSong"}"#;
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(line, "e.json", RecordErrorMode::Fail, &mut stats).unwrap();
    assert_eq!(events[0].user_id.as_deref(), Some("26"));
}

#[test]
fn test_blank_lines_ignored() {
    let body = format!("\n{EVENT_LINE}\n\n{HOME_LINE}\n");
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(&body, "e.json", RecordErrorMode::Fail, &mut stats).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(stats.records, 2);
}

#[test]
fn test_malformed_fails_fast() {
    let body = format!("{EVENT_LINE}\n{{not json\n{HOME_LINE}");
    let mut stats = ReadStats::default();
    let err = decode_lines::<EventRecord>(&body, "bad.json", RecordErrorMode::Fail, &mut stats)
        .unwrap_err();

    match err {
        Error::MalformedRecord { location, line, .. } => {
            assert_eq!(location, "bad.json");
            assert_eq!(line, 2);
        }
        other => panic!("Expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn test_malformed_skipped_and_counted() {
    let missing_ts = r#"{"page": "NextSong", "userId": "1"}"#;
    let body = format!("{EVENT_LINE}\n{{not json\n{missing_ts}\n{HOME_LINE}");
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(&body, "bad.json", RecordErrorMode::Skip, &mut stats).unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.skipped, 2);
}

#[test]
fn test_validation_rejects_empty_song_id() {
    let line = r#"{"song_id": "", "title": "x", "artist_id": "AR1"}"#;
    let mut stats = ReadStats::default();
    let err =
        decode_lines::<SongRecord>(line, "s.json", RecordErrorMode::Fail, &mut stats).unwrap_err();
    assert!(err.to_string().contains("song_id is empty"));
}

#[test]
fn test_validation_rejects_out_of_range_ts() {
    let line = format!(r#"{{"ts": {}, "page": "NextSong"}}"#, i64::MAX);
    let mut stats = ReadStats::default();
    let events: Vec<EventRecord> =
        decode_lines(&line, "e.json", RecordErrorMode::Skip, &mut stats).unwrap();
    assert!(events.is_empty());
    assert_eq!(stats.skipped, 1);
}

// ============================================================================
// Reader Tests
// ============================================================================

async fn seeded_location() -> StorageLocation {
    let location = StorageLocation::from_store(Arc::new(InMemory::new()), "input", "memory");
    location
        .put(
            "log_data/2018/11/2018-11-13-events.json",
            Bytes::from(HOME_LINE.to_string()),
        )
        .await
        .unwrap();
    location
        .put(
            "log_data/2018/11/2018-11-12-events.json",
            Bytes::from(EVENT_LINE.to_string()),
        )
        .await
        .unwrap();
    location
        .put("log_data/2018/11/README.md", Bytes::from_static(b"# not data"))
        .await
        .unwrap();
    location
        .put(
            "song_data/A/B/C/TRABCEI128F424C983.json",
            Bytes::from(SONG_LINE.to_string()),
        )
        .await
        .unwrap();
    location
}

#[tokio::test]
async fn test_reader_sorted_source_order() {
    let location = seeded_location().await;
    let reader = SourceReader::new(&location, RecordErrorMode::Fail);

    let glob = GlobPattern::new("log_data/*/*/*.json").unwrap();
    let events = reader.read_events(&glob).await.unwrap();

    assert_eq!(events.stats.files, 2);
    assert_eq!(events.records.len(), 2);
    // 2018-11-12 sorts before 2018-11-13
    assert_eq!(events.records[0].page, "NextSong");
    assert_eq!(events.records[1].page, "Home");
}

#[tokio::test]
async fn test_reader_songs() {
    let location = seeded_location().await;
    let reader = SourceReader::new(&location, RecordErrorMode::Fail);

    let glob = GlobPattern::new("song_data/*/*/*/*.json").unwrap();
    let songs = reader.read_songs(&glob).await.unwrap();
    assert_eq!(songs.stats.files, 1);
    assert_eq!(songs.records[0].title, "Der Kleine Dompfaff");
}

#[tokio::test]
async fn test_reader_no_files_is_error() {
    let location = seeded_location().await;
    let reader = SourceReader::new(&location, RecordErrorMode::Skip);

    let glob = GlobPattern::new("song_data/*.json").unwrap();
    let err = reader.read_songs(&glob).await.unwrap_err();
    assert!(matches!(err, Error::NoInputFiles { .. }));
}
