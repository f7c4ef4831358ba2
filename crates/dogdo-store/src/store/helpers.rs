//! Helper functions for store module

use crate::error::Error;
use crate::event::{EventKind, StoredEvent};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::path::PathBuf;

/// Convert a SQLite row to a StoredEvent
pub(crate) fn row_to_stored_event(row: SqliteRow) -> Result<StoredEvent, Error> {
    let event_type_str: String = row
        .try_get("event_type")
        .map_err(|e| Error::Database(e.to_string()))?;
    let event_type: EventKind = event_type_str
        .parse()
        .map_err(|e: String| Error::Serialization(e))?;

    Ok(StoredEvent {
        id: Some(row.try_get("id").map_err(|e| Error::Database(e.to_string()))?),
        event_type,
        item_type: row
            .try_get("item_type")
            .map_err(|e| Error::Database(e.to_string()))?,
        item_name: row
            .try_get("item_name")
            .map_err(|e| Error::Database(e.to_string()))?,
        quantity: row
            .try_get("quantity")
            .map_err(|e| Error::Database(e.to_string()))?,
        timestamp: row
            .try_get("timestamp")
            .map_err(|e| Error::Database(e.to_string()))?,
    })
}

/// Get the default data directory for DogDo
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".dogdo"))
        .unwrap_or_else(|| PathBuf::from(".dogdo"))
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    default_data_dir().join("dogdo.db")
}
