//! Singleton preference values kept in the key-value store
//!
//! Each key holds one string. JSON keys keep the exact serialized snapshot of
//! whatever the UI last sent; text keys keep the raw string.

use crate::error::{Error, Result};
use serde_json::Value;

/// How a preference value is written to its string slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// Serialized JSON snapshot
    Json,
    /// Plain string, stored verbatim
    Text,
}

/// Known preference keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// The dog's name
    DogName,
    /// Metric or imperial
    UnitSystem,
    /// UI settings blob
    Settings,
    /// UI defaults blob
    Defaults,
}

impl PreferenceKey {
    /// All keys, in startup replay order
    pub const ALL: [PreferenceKey; 4] = [
        Self::DogName,
        Self::UnitSystem,
        Self::Settings,
        Self::Defaults,
    ];

    /// Key under which the value is stored
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DogName => "dogName",
            Self::UnitSystem => "unitSystem",
            Self::Settings => "settings",
            Self::Defaults => "defaults",
        }
    }

    /// Encoding used for this key
    #[must_use]
    pub fn encoding(&self) -> ValueEncoding {
        match self {
            Self::DogName | Self::UnitSystem => ValueEncoding::Text,
            Self::Settings | Self::Defaults => ValueEncoding::Json,
        }
    }

    /// Encode a UI value for storage
    pub fn encode(&self, value: &Value) -> Result<String> {
        match self.encoding() {
            ValueEncoding::Json => serde_json::to_string(value)
                .map_err(|e| Error::Serialization(format!("{}: {e}", self.as_str()))),
            ValueEncoding::Text => Ok(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Decode a stored string back into the UI value
    pub fn decode(&self, raw: &str) -> Result<Value> {
        match self.encoding() {
            ValueEncoding::Json => serde_json::from_str(raw)
                .map_err(|e| Error::Serialization(format!("{}: {e}", self.as_str()))),
            ValueEncoding::Text => Ok(Value::String(raw.to_string())),
        }
    }
}

impl std::fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
