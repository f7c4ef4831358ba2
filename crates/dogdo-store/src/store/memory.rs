//! Volatile preference storage
//!
//! Used when the database cannot be opened so preference intents still
//! work for the lifetime of the process.

use super::traits::PreferenceStore;
use crate::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn close(&self) {}

    fn name(&self) -> &str {
        "memory"
    }
}
