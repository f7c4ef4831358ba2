use super::SqliteStore;
use crate::error::{Error, Result};
use tracing::debug;

impl SqliteStore {
    pub(crate) async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_type TEXT NOT NULL,
                item_type TEXT NOT NULL,
                item_name TEXT NOT NULL,
                quantity REAL NOT NULL,
                timestamp INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        // Indexed fields
        for (name, column) in [
            ("idx_events_event_type", "event_type"),
            ("idx_events_item_type", "item_type"),
            ("idx_events_item_name", "item_name"),
            ("idx_events_quantity", "quantity"),
            ("idx_events_timestamp", "timestamp"),
        ] {
            let sql = format!("CREATE INDEX IF NOT EXISTS {name} ON events({column})");
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Database migrations completed");
        Ok(())
    }
}
