//! DogDo Store - persistence adapter
//!
//! This crate sits between the DogDo UI and local durable state:
//! - Event: UI and storage representations of pet-care events
//! - Timestamp: ISO-8601 <-> epoch-millisecond conversion
//! - Preferences: singleton settings/defaults/text values
//! - Store: SQLite-backed event and preference storage
//! - Adapter: intent handling and outbound notifications

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod error;
pub mod event;
pub mod preferences;
pub mod store;
pub mod timestamp;

pub use adapter::{
    LoadReport, Notification, NotificationBus, SettingsReceipt, StoreAdapter,
};
pub use error::{Error, Result};
pub use event::{Event, EventKind, StoredEvent};
pub use preferences::{PreferenceKey, ValueEncoding};
pub use store::{
    default_data_dir, default_db_path, EventStoreTrait, MemoryPreferences, PreferenceStore,
    SqliteStore,
};
pub use timestamp::{epoch_millis_to_iso, iso_to_epoch_millis};
