//! StoreAdapter - the single intermediary between the UI and local storage
//!
//! Every intent returns a typed [`Result`] to its caller and also publishes
//! the matching [`Notification`] on the bus, so a UI bridge can forward
//! outcomes without inspecting return values. Failed writes publish
//! `persist_failed` instead of being dropped.
//!
//! The UI only ever sees ISO-8601 timestamps; the storage traits only ever
//! see epoch milliseconds.

mod notification;


pub use notification::{Notification, NotificationBus};

use crate::error::{Error, Result};
use crate::event::Event;
use crate::preferences::{PreferenceKey, ValueEncoding};
use crate::store::{EventStoreTrait, PreferenceStore, SqliteStore};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Counts from the startup replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Preference values replayed
    pub preferences: usize,
    /// Events replayed
    pub events: usize,
    /// Whether the event store was reachable
    pub storage_available: bool,
}

/// Durable confirmation for a settings save
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsReceipt {
    /// The value written
    pub settings: Value,
    /// When the write completed
    pub persisted_at: DateTime<Utc>,
}

/// Translates UI intents into storage operations
pub struct StoreAdapter {
    events: Option<Arc<dyn EventStoreTrait>>,
    preferences: Arc<dyn PreferenceStore>,
    unavailable_reason: String,
    bus: NotificationBus,
}

impl StoreAdapter {
    /// Create an adapter over an event store and a preference store
    pub fn new(
        events: Arc<dyn EventStoreTrait>,
        preferences: Arc<dyn PreferenceStore>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            events: Some(events),
            preferences,
            unavailable_reason: String::new(),
            bus,
        }
    }

    /// Create an adapter backed by one SQLite store for both roles
    pub fn from_sqlite(store: SqliteStore, bus: NotificationBus) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, bus)
    }

    /// Create an adapter with no event store.
    ///
    /// Event intents fail with [`Error::StorageUnavailable`]; preference
    /// intents still go to `preferences`.
    pub fn degraded(
        preferences: Arc<dyn PreferenceStore>,
        reason: impl Into<String>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            events: None,
            preferences,
            unavailable_reason: reason.into(),
            bus,
        }
    }

    /// Subscribe to outbound notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.bus.subscribe()
    }

    /// The notification bus
    #[must_use]
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Whether event intents can reach storage
    #[must_use]
    pub fn has_event_store(&self) -> bool {
        self.events.is_some()
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Replay persisted state to the UI.
    ///
    /// Publishes one notification per stored preference, then one
    /// `event_loaded` per stored event in timestamp order. Values that fail
    /// to decode are logged and skipped.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for key in PreferenceKey::ALL {
            let Some(raw) = self.preferences.get(key.as_str()).await? else {
                continue;
            };
            if key.encoding() == ValueEncoding::Text && raw.is_empty() {
                debug!(key = %key, "Skipping empty preference");
                continue;
            }
            match loaded_notification(key, &raw) {
                Ok(notification) => {
                    self.bus.publish(notification).await;
                    report.preferences += 1;
                }
                Err(e) => warn!(key = %key, error = %e, "Skipping unreadable preference"),
            }
        }

        let Some(store) = &self.events else {
            warn!(
                preferences = self.preferences.name(),
                reason = %self.unavailable_reason,
                "Event storage unavailable, long-term storage disabled"
            );
            self.bus
                .publish(Notification::StorageUnavailable {
                    reason: self.unavailable_reason.clone(),
                })
                .await;
            return Ok(report);
        };
        report.storage_available = true;

        let stored = store.list_by_timestamp().await?;
        if stored.is_empty() {
            info!(store = store.name(), "No events to start with");
        }

        for record in stored {
            match record.to_event() {
                Ok(event) => {
                    self.bus.publish(Notification::EventLoaded { event }).await;
                    report.events += 1;
                }
                Err(e) => warn!(event_id = ?record.id, error = %e, "Skipping unreadable event"),
            }
        }

        debug!(
            preferences = report.preferences,
            events = report.events,
            "Startup replay complete"
        );
        Ok(report)
    }

    // =========================================================================
    // Event intents
    // =========================================================================

    /// Persist a new event and confirm it with its assigned id
    #[instrument(skip(self, event), fields(item_name = %event.item_name))]
    pub async fn save_event(&self, event: Event) -> Result<Event> {
        let outcome = self.insert_event(&event).await;
        self.report_failure("save_event", outcome).await
    }

    async fn insert_event(&self, event: &Event) -> Result<Event> {
        let store = self.event_store()?;
        let stored = event.to_insert()?;
        let id = store.insert(&stored).await?;

        let confirmed = stored.to_event()?.with_id(id);
        debug!(event_id = id, "Event saved");
        self.bus
            .publish(Notification::EventConfirmed {
                event: confirmed.clone(),
            })
            .await;
        Ok(confirmed)
    }

    /// Replace an existing event.
    ///
    /// Returns `Ok(None)` and publishes nothing when no event carries the
    /// given id.
    #[instrument(skip(self, event), fields(event_id = ?event.id))]
    pub async fn update_event(&self, event: Event) -> Result<Option<Event>> {
        let outcome = self.replace_event(&event).await;
        self.report_failure("update_event", outcome).await
    }

    async fn replace_event(&self, event: &Event) -> Result<Option<Event>> {
        let store = self.event_store()?;
        let stored = event.to_update()?;

        if !store.update(&stored).await? {
            debug!(event_id = ?stored.id, "No event to update");
            return Ok(None);
        }

        let confirmed = stored.to_event()?;
        self.bus
            .publish(Notification::UpdateConfirmed {
                event: confirmed.clone(),
            })
            .await;
        Ok(Some(confirmed))
    }

    // =========================================================================
    // Preference intents
    // =========================================================================

    /// Replace the settings snapshot.
    ///
    /// `settings_accepted` is published before the write, whatever its
    /// outcome; `settings_persisted` follows once the write completes.
    #[instrument(skip(self, settings))]
    pub async fn save_settings(&self, settings: Value) -> Result<SettingsReceipt> {
        self.bus
            .publish(Notification::SettingsAccepted {
                settings: settings.clone(),
            })
            .await;

        let outcome = self.write_preference(PreferenceKey::Settings, &settings).await;
        self.report_failure("save_settings", outcome).await?;

        self.bus
            .publish(Notification::SettingsPersisted {
                settings: settings.clone(),
            })
            .await;
        Ok(SettingsReceipt {
            settings,
            persisted_at: Utc::now(),
        })
    }

    /// Replace the defaults snapshot
    #[instrument(skip(self, defaults))]
    pub async fn save_defaults(&self, defaults: Value) -> Result<()> {
        let outcome = self.write_preference(PreferenceKey::Defaults, &defaults).await;
        self.report_failure("save_defaults", outcome).await
    }

    /// Replace the stored dog name
    #[instrument(skip(self))]
    pub async fn save_dog_name(&self, name: &str) -> Result<()> {
        let outcome = self
            .write_preference(PreferenceKey::DogName, &Value::String(name.to_string()))
            .await;
        self.report_failure("save_dog_name", outcome).await
    }

    /// Replace the stored unit system
    #[instrument(skip(self))]
    pub async fn save_unit_system(&self, unit_system: &str) -> Result<()> {
        let outcome = self
            .write_preference(
                PreferenceKey::UnitSystem,
                &Value::String(unit_system.to_string()),
            )
            .await;
        self.report_failure("save_unit_system", outcome).await
    }

    /// Close the storage handles
    pub async fn close(&self) {
        if let Some(store) = &self.events {
            store.close().await;
        }
        self.preferences.close().await;
        debug!("Store adapter closed");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn event_store(&self) -> Result<&Arc<dyn EventStoreTrait>> {
        self.events
            .as_ref()
            .ok_or_else(|| Error::StorageUnavailable(self.unavailable_reason.clone()))
    }

    async fn write_preference(&self, key: PreferenceKey, value: &Value) -> Result<()> {
        let raw = key.encode(value)?;
        self.preferences.set(key.as_str(), &raw).await
    }

    async fn report_failure<T>(&self, intent: &str, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            warn!(intent, error = %e, "Persist failed");
            self.bus
                .publish(Notification::PersistFailed {
                    intent: intent.to_string(),
                    message: e.to_string(),
                })
                .await;
        }
        outcome
    }
}

fn loaded_notification(key: PreferenceKey, raw: &str) -> Result<Notification> {
    Ok(match key {
        PreferenceKey::DogName => Notification::DogNameLoaded {
            name: raw.to_string(),
        },
        PreferenceKey::UnitSystem => Notification::UnitSystemLoaded {
            unit_system: raw.to_string(),
        },
        PreferenceKey::Settings => Notification::SettingsLoaded {
            settings: key.decode(raw)?,
        },
        PreferenceKey::Defaults => Notification::DefaultsLoaded {
            defaults: key.decode(raw)?,
        },
    })
}
