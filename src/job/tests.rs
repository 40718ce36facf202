//! Tests for job module

use super::*;
use crate::config::EtlConfig;
use crate::error::Error;
use crate::storage::StorageLocation;
use crate::types::RecordErrorMode;
use bytes::Bytes;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SONGS: &str = r#"{"num_songs": 1, "artist_id": "AR5KOSW1187FB35FF4", "artist_latitude": 49.80388, "artist_longitude": 15.47491, "artist_location": "Dubai UAE", "artist_name": "Elena", "song_id": "SOZCTXZ12AB0182364", "title": "Setanta matins", "duration": 269.58322, "year": 0}
{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 2004}"#;

const EVENTS: &str = r#"{"artist":"Elena","auth":"Logged In","firstName":"Lily","gender":"F","itemInSession":1,"lastName":"Koch","length":269.58322,"level":"paid","location":"Chicago-Naperville-Elgin, IL-IN-WI","method":"PUT","page":"NextSong","registration":1541048010796.0,"sessionId":818,"song":"Setanta matins","status":200,"ts":1541990795796,"userAgent":"Mozilla/5.0","userId":"15"}
{"artist":"Des'ree","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":0,"lastName":"Summers","length":246.30812,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"You Gotta Be","status":200,"ts":1541106106796,"userAgent":"Mozilla/5.0","userId":"8"}
{"artist":null,"auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":2,"lastName":"Summers","length":null,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"GET","page":"Upgrade","registration":1540344794796.0,"sessionId":139,"song":null,"status":200,"ts":1541106352796,"userAgent":"Mozilla/5.0","userId":"8"}"#;

fn config(mode: RecordErrorMode, verify: bool) -> EtlConfig {
    let mut config = EtlConfig::default();
    config.source.url = "memory://source".to_string();
    config.destination.url = "memory://destination".to_string();
    config.read.on_malformed = mode;
    config.output.verify = verify;
    config
}

async fn seeded_source(events: &str) -> StorageLocation {
    let source = StorageLocation::from_store(Arc::new(InMemory::new()), "", "memory");
    source
        .put(
            "song_data/A/B/C/TRABCEI128F424C983.json",
            Bytes::from(SONGS.to_string()),
        )
        .await
        .unwrap();
    source
        .put(
            "log_data/2018/11/2018-11-12-events.json",
            Bytes::from(events.to_string()),
        )
        .await
        .unwrap();
    source
}

fn destination() -> StorageLocation {
    StorageLocation::from_store(Arc::new(InMemory::new()), "", "memory")
}

#[tokio::test]
async fn test_run_builds_all_tables() {
    let source = seeded_source(EVENTS).await;
    let destination = destination();
    let config = config(RecordErrorMode::Fail, true);

    let report = Job::new(&config)
        .run_with(&source, &destination)
        .await
        .unwrap();

    assert_eq!(report.song_data.files, 1);
    assert_eq!(report.song_data.records, 2);
    assert_eq!(report.log_data.records, 3);
    assert_eq!(report.matched_songplays, 1);
    assert_eq!(report.unmatched_songplays, 1);
    assert!(report.verified);

    let rows: Vec<(TableName, usize)> = report.tables.iter().map(|t| (t.table, t.rows)).collect();
    assert_eq!(
        rows,
        vec![
            (TableName::Songs, 2),
            (TableName::Artists, 2),
            (TableName::Users, 2),
            (TableName::Time, 2),
            (TableName::Songplays, 2),
        ]
    );

    let songplays = destination.list("songplays_table").await.unwrap();
    assert_eq!(
        songplays,
        vec!["songplays_table/year=2018/month=11/part-00000.parquet".to_string()]
    );
}

#[tokio::test]
async fn test_run_matches_alternate_spelling_and_tolerance() {
    let songs = r#"{"artist_id": "AR5KOSW1187FB35FF4", "artist_name": "Elena", "song_id": "SOZCTXZ12AB0182364", "title": "Setanta matins", "duration": 269.58322, "year": 0}
{"artist_id": "AR5KOSW1187FB35FF4", "artist_name": "Elena feat. X", "song_id": "SOOTHER12AB0182364", "title": "Other Song", "duration": 200.0, "year": 0}"#;
    let events = r#"{"artist":"Elena","firstName":"Lily","lastName":"Koch","gender":"F","level":"paid","itemInSession":1,"length":269.583220001,"page":"NextSong","sessionId":818,"song":"Setanta matins","ts":1541990795796,"userId":"15"}
{"artist":"Elena feat. X","firstName":"Lily","lastName":"Koch","gender":"F","level":"paid","itemInSession":2,"length":200.0,"page":"NextSong","sessionId":818,"song":"Other Song","ts":1541990995796,"userId":"15"}"#;

    let source = StorageLocation::from_store(Arc::new(InMemory::new()), "", "memory");
    source
        .put("song_data/A/B/C/TRA.json", Bytes::from(songs.to_string()))
        .await
        .unwrap();
    source
        .put(
            "log_data/2018/11/2018-11-12-events.json",
            Bytes::from(events.to_string()),
        )
        .await
        .unwrap();

    let mut config = config(RecordErrorMode::Fail, false);
    let exact = Job::new(&config)
        .run_with(&source, &destination())
        .await
        .unwrap();
    assert_eq!(exact.matched_songplays, 1);
    assert_eq!(exact.unmatched_songplays, 1);

    config.join.duration_tolerance = 1e-6;
    let tolerant = Job::new(&config)
        .run_with(&source, &destination())
        .await
        .unwrap();
    assert_eq!(tolerant.matched_songplays, 2);
    assert_eq!(tolerant.unmatched_songplays, 0);
}

#[tokio::test]
async fn test_rerun_replaces_output() {
    let source = seeded_source(EVENTS).await;
    let destination = destination();
    let config = config(RecordErrorMode::Fail, false);
    let job = Job::new(&config);

    job.run_with(&source, &destination).await.unwrap();
    let first = destination.list("").await.unwrap();
    let first_bytes = destination
        .get("songplays_table/year=2018/month=11/part-00000.parquet")
        .await
        .unwrap();

    let report = job.run_with(&source, &destination).await.unwrap();
    assert_eq!(destination.list("").await.unwrap(), first);
    assert_eq!(
        destination
            .get("songplays_table/year=2018/month=11/part-00000.parquet")
            .await
            .unwrap(),
        first_bytes
    );
    assert!(report.tables.iter().all(|t| t.removed == t.files));
}

#[tokio::test]
async fn test_malformed_line_fails_run() {
    let events = format!("{EVENTS}\nnot json");
    let source = seeded_source(&events).await;
    let config = config(RecordErrorMode::Fail, false);

    let err = Job::new(&config)
        .run_with(&source, &destination())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { line: 4, .. }));
}

#[tokio::test]
async fn test_malformed_line_skipped_and_counted() {
    let events = format!("{EVENTS}\nnot json");
    let source = seeded_source(&events).await;
    let config = config(RecordErrorMode::Skip, false);

    let report = Job::new(&config)
        .run_with(&source, &destination())
        .await
        .unwrap();
    assert_eq!(report.log_data.skipped, 1);
    assert_eq!(report.skipped_records(), 1);
    assert_eq!(report.log_data.records, 3);
}

#[tokio::test]
async fn test_missing_input_is_an_error() {
    let source = StorageLocation::from_store(Arc::new(InMemory::new()), "", "memory");
    let config = config(RecordErrorMode::Fail, false);

    let err = Job::new(&config)
        .run_with(&source, &destination())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoInputFiles { .. }));
}

#[tokio::test]
async fn test_run_rejects_invalid_config() {
    let mut config = config(RecordErrorMode::Fail, false);
    config.destination.url = String::new();

    let err = Job::new(&config).run().await.unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_report_serializes() {
    let mut report = RunReport::new("file:///in", "file:///out");
    report.set_duration(12);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["source"], "file:///in");
    assert_eq!(json["duration_ms"], 12);
    assert_eq!(json["song_data"]["skipped"], 0);
}
