//! Stdio bridge between the UI and the store adapter
//!
//! Intents arrive as one JSON object per line; every notification the
//! adapter publishes is written back as one JSON object per line.

mod intent;

pub use intent::Intent;

use anyhow::{Context, Result};
use dogdo_store::{Notification, StoreAdapter};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Notifications buffered between the adapter and the writer before
/// publishers start waiting
pub const OUTPUT_BUFFER: usize = 256;

/// What happened during one bridge session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Events replayed at startup
    pub replayed_events: usize,
    /// Intents decoded and dispatched
    pub intents: usize,
    /// Lines that could not be decoded
    pub rejected: usize,
    /// Dispatched intents that returned an error
    pub failed: usize,
}

/// Serve the bridge until `input` reaches EOF.
///
/// Replays stored state first, then dispatches each intent on its own task.
/// Output goes through the bus sink, so a slow reader slows the intents
/// down instead of losing notifications. On EOF (or a read error) waits for
/// in-flight intents and hands the output back once every notification has
/// been written. Closing the adapter is left to the caller.
pub async fn serve<R, W>(
    adapter: Arc<StoreAdapter>,
    input: R,
    output: W,
) -> Result<(BridgeSummary, W)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let notifications = adapter.bus().attach_sink(OUTPUT_BUFFER).await;
    let writer = tokio::spawn(write_notifications(notifications, output));

    let mut summary = BridgeSummary::default();
    match adapter.load().await {
        Ok(report) => summary.replayed_events = report.events,
        Err(e) => warn!(error = %e, "Startup replay failed"),
    }

    let mut tasks = JoinSet::new();
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();
    let read_error = loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break None,
            Ok(_) => {}
            Err(e) => break Some(e),
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match decode_intent(&line) {
            Ok(intent) => {
                debug!(intent = intent.name(), "Dispatching intent");
                summary.intents += 1;
                let adapter = Arc::clone(&adapter);
                tasks.spawn(async move { intent.dispatch(&adapter).await });
            }
            Err(message) => {
                warn!(error = %message, "Rejected intent");
                summary.rejected += 1;
                adapter
                    .bus()
                    .publish(Notification::IntentRejected { message })
                    .await;
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            tally(&mut summary, joined);
        }
    };

    while let Some(joined) = tasks.join_next().await {
        tally(&mut summary, joined);
    }

    adapter.bus().detach_sink().await;
    let output = writer
        .await
        .context("Notification writer panicked")?
        .context("Failed to write notification")?;

    if let Some(e) = read_error {
        return Err(e).context("Failed to read intent");
    }

    info!(
        intents = summary.intents,
        rejected = summary.rejected,
        failed = summary.failed,
        "Bridge session finished"
    );
    Ok((summary, output))
}

fn decode_intent(line: &[u8]) -> std::result::Result<Intent, String> {
    let text = std::str::from_utf8(line).map_err(|e| format!("invalid UTF-8: {e}"))?;
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn tally(
    summary: &mut BridgeSummary,
    joined: std::result::Result<dogdo_store::Result<()>, tokio::task::JoinError>,
) {
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(_)) => summary.failed += 1,
        Err(e) => {
            warn!(error = %e, "Intent task aborted");
            summary.failed += 1;
        }
    }
}

async fn write_notifications<W>(
    mut notifications: mpsc::Receiver<Notification>,
    mut out: W,
) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(notification) = notifications.recv().await {
        let mut line = serde_json::to_vec(&notification)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dogdo_store::{NotificationBus, PreferenceStore, SqliteStore};
    use serde_json::Value;
    use std::time::Duration;

    async fn run(adapter: Arc<StoreAdapter>, input: &[u8]) -> (BridgeSummary, Vec<Value>) {
        let (summary, output) = serve(adapter, input, Vec::new())
            .await
            .unwrap();
        let notes = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (summary, notes)
    }

    async fn bridge_adapter() -> (Arc<StoreAdapter>, SqliteStore) {
        let store = SqliteStore::in_memory().await.unwrap();
        let adapter = StoreAdapter::from_sqlite(store.clone(), NotificationBus::new(64));
        (Arc::new(adapter), store)
    }

    #[tokio::test]
    async fn test_save_event_round_trip() {
        let (adapter, store) = bridge_adapter().await;
        let input = concat!(
            r#"{"type":"save_event","event":{"eventType":"administer","itemType":"food","itemName":"Kibble","quantity":1,"timestamp":"2020-01-01T00:00:00.000Z"}}"#,
            "\n"
        );

        let (summary, notes) = run(adapter, input.as_bytes()).await;
        assert_eq!(summary.intents, 1);
        assert_eq!(summary.failed, 0);

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["type"], "event_confirmed");
        assert_eq!(notes[0]["event"]["timestamp"], "2020-01-01T00:00:00.000Z");
        assert!(notes[0]["event"]["id"].is_i64());

        let rows = store.list_events().await.unwrap();
        assert_eq!(rows[0].timestamp, 1_577_836_800_000);
    }

    #[tokio::test]
    async fn test_replay_precedes_intents() {
        let (adapter, _store) = bridge_adapter().await;
        adapter.save_dog_name("Rex").await.unwrap();

        let input = "{\"type\":\"save_settings\",\"settings\":{\"a\":1}}\n";
        let (summary, notes) = run(adapter, input.as_bytes()).await;

        assert_eq!(summary.replayed_events, 0);
        let kinds: Vec<_> = notes.iter().map(|n| n["type"].clone()).collect();
        assert_eq!(
            kinds,
            vec!["dog_name_loaded", "settings_accepted", "settings_persisted"]
        );
    }

    #[tokio::test]
    async fn test_bad_lines_are_rejected_not_fatal() {
        let (adapter, _store) = bridge_adapter().await;
        let input = "not json\n\n{\"type\":\"save_dog_name\",\"name\":\"Rex\"}\n";

        let (summary, notes) = run(adapter, input.as_bytes()).await;
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.intents, 1);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["type"], "intent_rejected");
    }

    #[tokio::test]
    async fn test_update_of_unknown_event_is_silent() {
        let (adapter, store) = bridge_adapter().await;
        let input = concat!(
            r#"{"type":"update_event","event":{"id":77,"eventType":"purchase","itemType":"food","itemName":"Kibble","quantity":1,"timestamp":"2020-01-01T00:00:00.000Z"}}"#,
            "\n"
        );

        let (summary, notes) = run(adapter, input.as_bytes()).await;
        assert_eq!(summary.failed, 0);
        assert!(notes.is_empty());
        assert_eq!(store.count_events().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_rejected_not_fatal() {
        let (adapter, store) = bridge_adapter().await;
        let mut input = b"{\"type\":\"save_dog_name\",\"name\":\"".to_vec();
        input.push(0xff);
        input.extend_from_slice(b"\"}\n{\"type\":\"save_settings\",\"settings\":{\"a\":1}}\n");

        let (summary, notes) = run(adapter, &input).await;
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.intents, 1);
        let kinds: Vec<_> = notes.iter().map(|n| n["type"].clone()).collect();
        assert_eq!(
            kinds,
            vec!["intent_rejected", "settings_accepted", "settings_persisted"]
        );
        assert_eq!(store.get("dogName").await.unwrap(), None);
        assert!(store.get("settings").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_slow_reader_receives_every_notification() {
        let (adapter, _store) = bridge_adapter().await;
        let input: String = (0..600)
            .map(|i| format!("{{\"type\":\"save_settings\",\"settings\":{{\"n\":{i}}}}}\n"))
            .collect();

        let (ui_side, bridge_side) = tokio::io::duplex(1024);
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(ui_side).lines();
            let mut count = 0usize;
            while lines.next_line().await.unwrap().is_some() {
                tokio::time::sleep(Duration::from_micros(200)).await;
                count += 1;
            }
            count
        });

        let (summary, bridge_side) = serve(adapter, input.as_bytes(), bridge_side)
            .await
            .unwrap();
        drop(bridge_side);

        assert_eq!(summary.intents, 600);
        assert_eq!(summary.failed, 0);
        assert_eq!(reader.await.unwrap(), 1200);
    }
}
