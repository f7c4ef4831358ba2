//! Outbound notifications and the broadcast bus that carries them

use crate::event::Event;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::warn;

/// Messages sent from the adapter to the UI.
///
/// Serialized with a snake_case `type` tag, one per line on the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Stored dog name replayed at startup
    DogNameLoaded {
        /// The stored name
        name: String,
    },
    /// Stored unit system replayed at startup
    UnitSystemLoaded {
        /// The stored unit system
        unit_system: String,
    },
    /// Stored settings replayed at startup
    SettingsLoaded {
        /// The settings snapshot
        settings: Value,
    },
    /// Stored defaults replayed at startup
    DefaultsLoaded {
        /// The defaults snapshot
        defaults: Value,
    },
    /// One stored event replayed at startup
    EventLoaded {
        /// The event, ISO timestamp
        event: Event,
    },
    /// A save-event intent was inserted
    EventConfirmed {
        /// The event with its assigned id
        event: Event,
    },
    /// An update-event intent matched and replaced a record
    UpdateConfirmed {
        /// The updated event
        event: Event,
    },
    /// Save-settings was received; sent before the write
    SettingsAccepted {
        /// The exact input value
        settings: Value,
    },
    /// Save-settings write completed
    SettingsPersisted {
        /// The value now on disk
        settings: Value,
    },
    /// The event store could not be reached at startup
    StorageUnavailable {
        /// Why storage is unavailable
        reason: String,
    },
    /// A save or update did not reach storage
    PersistFailed {
        /// Intent that failed (e.g. `save_event`)
        intent: String,
        /// Error description
        message: String,
    },
    /// The bridge could not decode an intent
    IntentRejected {
        /// Decode error
        message: String,
    },
}

impl Notification {
    /// The snake_case type tag
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DogNameLoaded { .. } => "dog_name_loaded",
            Self::UnitSystemLoaded { .. } => "unit_system_loaded",
            Self::SettingsLoaded { .. } => "settings_loaded",
            Self::DefaultsLoaded { .. } => "defaults_loaded",
            Self::EventLoaded { .. } => "event_loaded",
            Self::EventConfirmed { .. } => "event_confirmed",
            Self::UpdateConfirmed { .. } => "update_confirmed",
            Self::SettingsAccepted { .. } => "settings_accepted",
            Self::SettingsPersisted { .. } => "settings_persisted",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::PersistFailed { .. } => "persist_failed",
            Self::IntentRejected { .. } => "intent_rejected",
        }
    }
}

/// Bus for adapter notifications.
///
/// Broadcast subscribers that fall behind miss notifications (lagged). An
/// attached sink is a bounded queue instead: publishers wait for room, so
/// nothing sent to the sink is dropped.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
    sink: Arc<RwLock<Option<mpsc::Sender<Notification>>>>,
}

impl NotificationBus {
    /// Create a new bus with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sink: Arc::new(RwLock::new(None)),
        }
    }

    /// Subscribe to all future notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Attach the lossless sink, replacing any previous one.
    ///
    /// The receiver yields `None` once [`detach_sink`](Self::detach_sink)
    /// is called and every in-flight publish has finished.
    pub async fn attach_sink(&self, capacity: usize) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        *self.sink.write().await = Some(tx);
        rx
    }

    /// Drop the sink so its receiver can finish
    pub async fn detach_sink(&self) {
        self.sink.write().await.take();
    }

    /// Publish a notification.
    ///
    /// Waits for room in the sink when one is attached. Returns the number
    /// of broadcast receivers; with no subscribers the broadcast copy is
    /// dropped.
    pub async fn publish(&self, notification: Notification) -> usize {
        let sink = self.sink.read().await.clone();
        if let Some(sink) = sink {
            if sink.send(notification.clone()).await.is_err() {
                warn!(kind = notification.kind(), "Notification sink closed");
            }
        }
        self.sender.send(notification).unwrap_or(0)
    }

    /// Get the current number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}
