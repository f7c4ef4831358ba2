//! Integration tests for DogDo
//!
//! These tests drive a file-backed store through the adapter and verify
//! that state written in one session is replayed in the next.

use std::sync::Arc;

use dogdo_store::{
    Event, EventKind, MemoryPreferences, Notification, NotificationBus, SqliteStore, StoreAdapter,
};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::broadcast;

fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}

async fn open(dir: &TempDir) -> StoreAdapter {
    let store = SqliteStore::from_path(&dir.path().join("dogdo.db"))
        .await
        .unwrap();
    StoreAdapter::from_sqlite(store, NotificationBus::new(64))
}

// ============================================================================
// Session round trip
// ============================================================================

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();

    let first = open(&dir).await;
    let later = first
        .save_event(Event::new(
            EventKind::Purchase,
            "food",
            "Kibble",
            2.0,
            "2021-06-01T12:00:00Z",
        ))
        .await
        .unwrap();
    let earlier = first
        .save_event(Event::new(
            EventKind::Administer,
            "medicine",
            "Heartworm",
            1.0,
            "2020-01-01T00:00:00.000Z",
        ))
        .await
        .unwrap();
    first
        .save_settings(json!({"reminders": true}))
        .await
        .unwrap();
    first.save_defaults(json!({"food": 1.5})).await.unwrap();
    first.save_dog_name("Rex").await.unwrap();
    first.save_unit_system("metric").await.unwrap();
    first.close().await;

    let second = open(&dir).await;
    let mut rx = second.subscribe();
    let report = second.load().await.unwrap();
    assert!(report.storage_available);
    assert_eq!(report.preferences, 4);
    assert_eq!(report.events, 2);

    let notes = drain(&mut rx);
    let kinds: Vec<_> = notes.iter().map(Notification::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "dog_name_loaded",
            "unit_system_loaded",
            "settings_loaded",
            "defaults_loaded",
            "event_loaded",
            "event_loaded",
        ]
    );

    assert_eq!(notes[0], Notification::DogNameLoaded { name: "Rex".into() });
    assert_eq!(
        notes[2],
        Notification::SettingsLoaded {
            settings: json!({"reminders": true})
        }
    );
    assert_eq!(
        notes[4],
        Notification::EventLoaded {
            event: earlier.clone()
        }
    );
    assert_eq!(notes[5], Notification::EventLoaded { event: later });
    assert_eq!(earlier.timestamp, "2020-01-01T00:00:00.000Z");

    second.close().await;
}

#[tokio::test]
async fn test_update_survives_restart() {
    let dir = TempDir::new().unwrap();

    let first = open(&dir).await;
    let saved = first
        .save_event(Event::new(
            EventKind::Administer,
            "food",
            "Kibble",
            1.0,
            "2020-01-01T00:00:00.000Z",
        ))
        .await
        .unwrap();
    let mut edited = saved.clone();
    edited.quantity = 3.0;
    edited.item_name = "Wet food".into();
    assert!(first.update_event(edited.clone()).await.unwrap().is_some());
    first.close().await;

    let second = open(&dir).await;
    let mut rx = second.subscribe();
    second.load().await.unwrap();

    let notes = drain(&mut rx);
    assert_eq!(notes, vec![Notification::EventLoaded { event: edited }]);
    second.close().await;
}

#[tokio::test]
async fn test_later_settings_write_wins() {
    let dir = TempDir::new().unwrap();

    let first = open(&dir).await;
    first.save_settings(json!({"a": 1})).await.unwrap();
    first.save_settings(json!({"a": 2})).await.unwrap();
    first.close().await;

    let second = open(&dir).await;
    let mut rx = second.subscribe();
    second.load().await.unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![Notification::SettingsLoaded {
            settings: json!({"a": 2})
        }]
    );
    second.close().await;
}

// ============================================================================
// Concurrent intents
// ============================================================================

#[tokio::test]
async fn test_concurrent_saves_get_distinct_ids() {
    let dir = TempDir::new().unwrap();
    let adapter = Arc::new(open(&dir).await);

    let mut handles = Vec::new();
    for i in 0..8 {
        let adapter = Arc::clone(&adapter);
        handles.push(tokio::spawn(async move {
            adapter
                .save_event(Event::new(
                    EventKind::Purchase,
                    "treat",
                    format!("Biscuit {i}"),
                    1.0,
                    "2022-03-04T05:06:07.089Z",
                ))
                .await
                .unwrap()
                .id
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);

    adapter.close().await;
}

// ============================================================================
// Degraded mode
// ============================================================================

#[tokio::test]
async fn test_degraded_adapter_keeps_preferences_in_session() {
    let adapter = StoreAdapter::degraded(
        Arc::new(MemoryPreferences::new()),
        "disk full",
        NotificationBus::new(16),
    );
    let mut rx = adapter.subscribe();

    adapter.save_dog_name("Rex").await.unwrap();
    assert!(adapter
        .save_event(Event::new(
            EventKind::Administer,
            "food",
            "Kibble",
            1.0,
            "2020-01-01T00:00:00.000Z",
        ))
        .await
        .is_err());

    let report = adapter.load().await.unwrap();
    assert!(!report.storage_available);

    let kinds: Vec<_> = drain(&mut rx).iter().map(Notification::kind).collect();
    assert_eq!(
        kinds,
        vec!["persist_failed", "dog_name_loaded", "storage_unavailable"]
    );
}
