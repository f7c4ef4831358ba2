//! Inbound intents decoded from the UI

use dogdo_store::{Event, Result, StoreAdapter};
use serde::Deserialize;
use serde_json::Value;

/// One request from the UI, tagged by `type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Persist a new event (no id)
    SaveEvent { event: Event },
    /// Replace an existing event (id required)
    UpdateEvent { event: Event },
    /// Replace the settings snapshot
    SaveSettings { settings: Value },
    /// Replace the defaults snapshot
    SaveDefaults { defaults: Value },
    /// Replace the dog's name
    SaveDogName { name: String },
    /// Replace the unit system
    SaveUnitSystem { unit_system: String },
}

impl Intent {
    /// Intent name as it appears on the wire
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveEvent { .. } => "save_event",
            Self::UpdateEvent { .. } => "update_event",
            Self::SaveSettings { .. } => "save_settings",
            Self::SaveDefaults { .. } => "save_defaults",
            Self::SaveDogName { .. } => "save_dog_name",
            Self::SaveUnitSystem { .. } => "save_unit_system",
        }
    }

    /// Run the intent against the adapter. Outcomes reach the UI through
    /// the adapter's notifications; the result is for bookkeeping.
    pub async fn dispatch(self, adapter: &StoreAdapter) -> Result<()> {
        match self {
            Self::SaveEvent { event } => adapter.save_event(event).await.map(drop),
            Self::UpdateEvent { event } => adapter.update_event(event).await.map(drop),
            Self::SaveSettings { settings } => adapter.save_settings(settings).await.map(drop),
            Self::SaveDefaults { defaults } => adapter.save_defaults(defaults).await,
            Self::SaveDogName { name } => adapter.save_dog_name(&name).await,
            Self::SaveUnitSystem { unit_system } => adapter.save_unit_system(&unit_system).await,
        }
    }
}
