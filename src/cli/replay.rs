//! `dogdo replay` - print the startup replay as JSON lines

use super::open_adapter;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tokio::sync::broadcast::error::TryRecvError;

pub async fn run(config: &AppConfig, db_path: &Path) -> Result<()> {
    let adapter = open_adapter(config, db_path).await;
    let mut rx = adapter.subscribe();

    let report = adapter.load().await.context("Failed to load stored state")?;
    adapter.close().await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    loop {
        match rx.try_recv() {
            Ok(notification) => {
                serde_json::to_writer(&mut out, &notification)?;
                writeln!(out)?;
            }
            Err(TryRecvError::Lagged(skipped)) => {
                anyhow::bail!(
                    "{skipped} notifications dropped; raise bridge.notification_capacity"
                );
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    out.flush()?;

    eprintln!(
        "Replayed {} preferences and {} events",
        report.preferences, report.events
    );
    Ok(())
}
