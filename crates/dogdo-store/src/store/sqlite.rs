//! SqliteStore - SQLite-backed event and preference storage

use super::helpers::row_to_stored_event;
use super::traits::{EventStoreTrait, PreferenceStore};
use crate::error::{Error, Result};
use crate::event::StoredEvent;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Default pool size for file-backed stores
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Event and preference store on a single SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// Creates missing parent directories and runs migrations.
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        Self::with_options(db_path, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Open (or create) a store with an explicit pool size
    pub async fn with_options(db_path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Database(format!("failed to create directory: {e}")))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| Error::Database(format!("invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("SQLite store initialized at {}", db_path.display());
        Ok(store)
    }

    /// Create a new in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    // =========================================================================
    // Event operations
    // =========================================================================

    /// Insert an event, returning the assigned id
    #[instrument(skip(self, event), fields(item_name = %event.item_name))]
    pub async fn insert_event(&self, event: &StoredEvent) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (event_type, item_type, item_name, quantity, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(&event.item_type)
        .bind(&event.item_name)
        .bind(event.quantity)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!("Inserted event {}", id);
        Ok(id)
    }

    /// Replace an existing event in place. Returns whether a row matched.
    #[instrument(skip(self, event), fields(event_id = ?event.id))]
    pub async fn update_event(&self, event: &StoredEvent) -> Result<bool> {
        let id = event.id.ok_or(Error::MissingId)?;

        let result = sqlx::query(
            r#"
            UPDATE events
            SET event_type = ?2, item_type = ?3, item_name = ?4,
                quantity = ?5, timestamp = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(event.event_type.as_str())
        .bind(&event.item_type)
        .bind(&event.item_name)
        .bind(event.quantity)
        .bind(event.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let found = result.rows_affected() > 0;
        debug!(event_id = id, found, "Updated event");
        Ok(found)
    }

    /// List all events ordered by timestamp (ties by id)
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, item_type, item_name, quantity, timestamp
            FROM events
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(row_to_stored_event).collect()
    }

    /// Count stored events
    pub async fn count_events(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row.0)
    }

    // =========================================================================
    // Preference operations
    // =========================================================================

    /// Read a preference value
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(|(value,)| value))
    }

    /// Replace a preference value
    #[instrument(skip(self, value))]
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!(key, "Preference saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStoreTrait for SqliteStore {
    async fn insert(&self, event: &StoredEvent) -> Result<i64> {
        self.insert_event(event).await
    }

    async fn update(&self, event: &StoredEvent) -> Result<bool> {
        self.update_event(event).await
    }

    async fn list_by_timestamp(&self) -> Result<Vec<StoredEvent>> {
        self.list_events().await
    }

    async fn count(&self) -> Result<i64> {
        self.count_events().await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[async_trait::async_trait]
impl PreferenceStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_preference(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_preference(key, value).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
