//! CLI module for DogDo
//!
//! - `serve`: run the stdio bridge
//! - `replay`: print the startup replay and exit
//! - `stats`: show what is stored

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use dogdo_store::{
    EventStoreTrait, MemoryPreferences, NotificationBus, PreferenceKey, SqliteStore, StoreAdapter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub mod replay;
pub mod serve;
pub mod stats;

/// DogDo store CLI
#[derive(Parser, Debug)]
#[command(name = "dogdo")]
#[command(about = "Local persistence for the DogDo pet-care tracker")]
#[command(version)]
pub struct Cli {
    /// Database file (overrides configuration)
    #[arg(long, global = true, env = "DOGDO_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read JSON intents on stdin, write notifications on stdout
    Serve,
    /// Print stored state as notifications and exit
    Replay,
    /// Show stored event count and preferences
    Stats,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let db_path = cli.db.unwrap_or_else(|| config.storage.db_path());

    match cli.command {
        Some(Commands::Serve) => serve::run(&config, &db_path).await,
        Some(Commands::Replay) => replay::run(&config, &db_path).await,
        Some(Commands::Stats) => stats::run(&config, &db_path).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Open the adapter on `db_path`.
///
/// The bus is sized to hold the whole startup replay so no subscriber lags
/// during `load`. If the database cannot be opened the adapter runs without
/// an event store and keeps preferences in memory for this process.
pub(crate) async fn open_adapter(config: &AppConfig, db_path: &std::path::Path) -> StoreAdapter {
    let capacity = config.bridge.notification_capacity;

    match SqliteStore::with_options(db_path, config.storage.max_connections).await {
        Ok(store) => {
            let stored = match store.count().await {
                Ok(count) => count.max(0) as usize,
                Err(e) => {
                    warn!(store = store.name(), error = %e, "Failed to count stored events");
                    0
                }
            };
            let replay = stored + PreferenceKey::ALL.len() + 1;
            StoreAdapter::from_sqlite(store, NotificationBus::new(capacity.max(replay)))
        }
        Err(e) => {
            let bus = NotificationBus::new(capacity);
            warn!(
                path = %db_path.display(),
                error = %e,
                "Persistent storage unavailable, changes will not survive a restart"
            );
            StoreAdapter::degraded(Arc::new(MemoryPreferences::new()), e.to_string(), bus)
        }
    }
}
