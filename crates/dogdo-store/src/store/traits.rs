//! Traits for storage backends

use crate::error::Result;
use crate::event::StoredEvent;

/// Trait for event storage backends
///
/// This trait allows different storage implementations (SQLite, test doubles)
/// to be used interchangeably.
#[async_trait::async_trait]
pub trait EventStoreTrait: Send + Sync {
    /// Insert a new event and return the identifier assigned to it.
    /// Any `id` on the input is ignored.
    async fn insert(&self, event: &StoredEvent) -> Result<i64>;

    /// Replace the event whose id matches `event.id`.
    /// Returns `false` when no such event exists.
    async fn update(&self, event: &StoredEvent) -> Result<bool>;

    /// All events, oldest timestamp first
    async fn list_by_timestamp(&self) -> Result<Vec<StoredEvent>>;

    /// Number of stored events
    async fn count(&self) -> Result<i64>;

    /// Release the underlying connection
    async fn close(&self);

    /// Get the event store name (for logging)
    fn name(&self) -> &str;
}

/// Trait for string key-value storage
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Release the underlying connection
    async fn close(&self);

    /// Get the store name (for logging)
    fn name(&self) -> &str;
}
