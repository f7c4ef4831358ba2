//! `dogdo stats` - show record counts and stored preferences

use crate::config::AppConfig;
use anyhow::{Context, Result};
use dogdo_store::{PreferenceKey, PreferenceStore, SqliteStore};
use std::path::Path;

pub async fn run(config: &AppConfig, db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("No database at {}", db_path.display());
        return Ok(());
    }

    let store = SqliteStore::with_options(db_path, config.storage.max_connections)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    println!("Database:  {}", db_path.display());
    println!("Events:    {}", store.count_events().await?);
    for key in PreferenceKey::ALL {
        let state = preference_state(store.get(key.as_str()).await?.as_deref());
        println!("{:<10} {state}", format!("{key}:"));
    }

    PreferenceStore::close(&store).await;
    Ok(())
}

fn preference_state(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "set",
        None => "unset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_state_is_plain_ascii() {
        assert_eq!(preference_state(Some("Rex")), "set");
        assert_eq!(preference_state(None), "unset");
        assert!(preference_state(None).is_ascii());
    }
}
