//! Event - pet-care event records
//!
//! An event has two shapes: [`Event`] is what the UI sends and receives
//! (ISO-8601 timestamp, camelCase fields), [`StoredEvent`] is what the
//! storage engine persists (epoch-millisecond timestamp). Conversion between
//! them lives here and nowhere else.

use crate::error::{Error, Result};
use crate::timestamp::{epoch_millis_to_iso, iso_to_epoch_millis};
use serde::{Deserialize, Serialize};

/// What the user did with the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Item given to the dog (food, treat, medicine)
    Administer,
    /// Item bought
    Purchase,
}

impl EventKind {
    /// Returns the string representation of the event kind
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administer => "administer",
            Self::Purchase => "purchase",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "administer" => Ok(Self::Administer),
            "purchase" => Ok(Self::Purchase),
            _ => Err(format!("unknown event kind: {s}")),
        }
    }
}

/// An event as seen by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier assigned by storage; absent on create intents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Administer or purchase
    pub event_type: EventKind,

    /// Category of the item (food, treat, medicine, ...)
    pub item_type: String,

    /// Name of the item
    pub item_name: String,

    /// Amount administered or purchased
    pub quantity: f64,

    /// ISO-8601 timestamp
    pub timestamp: String,
}

impl Event {
    /// Create a new, not yet persisted event
    #[must_use]
    pub fn new(
        event_type: EventKind,
        item_type: impl Into<String>,
        item_name: impl Into<String>,
        quantity: f64,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            event_type,
            item_type: item_type.into(),
            item_name: item_name.into(),
            quantity,
            timestamp: timestamp.into(),
        }
    }

    /// Set the identifier
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Storage copy for a fresh insert. Any identifier is dropped since
    /// storage assigns its own.
    pub fn to_insert(&self) -> Result<StoredEvent> {
        Ok(StoredEvent {
            id: None,
            event_type: self.event_type,
            item_type: self.item_type.clone(),
            item_name: self.item_name.clone(),
            quantity: self.quantity,
            timestamp: iso_to_epoch_millis(&self.timestamp)?,
        })
    }

    /// Storage copy for an in-place update. The identifier is the lookup key.
    pub fn to_update(&self) -> Result<StoredEvent> {
        let id = self.id.ok_or(Error::MissingId)?;
        let mut stored = self.to_insert()?;
        stored.id = Some(id);
        Ok(stored)
    }
}

/// An event as persisted by the storage engine
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Row identifier; `None` until inserted
    pub id: Option<i64>,
    /// Administer or purchase
    pub event_type: EventKind,
    /// Category of the item
    pub item_type: String,
    /// Name of the item
    pub item_name: String,
    /// Amount administered or purchased
    pub quantity: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl StoredEvent {
    /// Convert back to the UI form, rendering the timestamp as ISO-8601
    pub fn to_event(&self) -> Result<Event> {
        Ok(Event {
            id: self.id,
            event_type: self.event_type,
            item_type: self.item_type.clone(),
            item_name: self.item_name.clone(),
            quantity: self.quantity,
            timestamp: epoch_millis_to_iso(self.timestamp)?,
        })
    }
}
