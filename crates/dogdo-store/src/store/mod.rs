//! Store - event and preference persistence
//!
//! Events live in an SQLite table with an auto-assigned integer id.
//! Preferences live in a string-keyed table beside them. Both are reached
//! through traits so the adapter can run with either backend missing.

mod helpers;
mod memory;
mod migrations;
mod sqlite;
mod traits;


pub use helpers::{default_data_dir, default_db_path};
pub use memory::MemoryPreferences;
pub use sqlite::SqliteStore;
pub use traits::{EventStoreTrait, PreferenceStore};
