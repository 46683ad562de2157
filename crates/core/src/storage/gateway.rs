use serde_json::Value;

use crate::errors::JournalError;
use crate::models::trade::TradeRecord;

use super::migration;
use super::store::KeyValueStore;

/// Sole reader and writer of the journal's storage slot.
///
/// The slot holds one JSON array of trade objects. There is no version
/// field; older record shapes are detected structurally and migrated on load.
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load every stored trade, migrated to the current shape.
    ///
    /// An absent slot yields an empty journal. Any failure (unreadable slot,
    /// invalid JSON, a record that cannot be decoded) is logged and also
    /// yields an empty journal: records are never partially loaded.
    pub fn load(&self) -> Vec<TradeRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to load trades from storage");
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load) but surfaces the failure instead of logging it.
    pub fn try_load(&self) -> Result<Vec<TradeRecord>, JournalError> {
        let raw = match self.store.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        let value: Value = serde_json::from_str(&raw)?;
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(JournalError::Deserialization(format!(
                    "Stored trades must be a JSON array, found {}",
                    json_kind(&other)
                )))
            }
        };

        items.into_iter().map(migration::migrate).collect()
    }

    /// Serialize the full sequence and overwrite the slot.
    pub fn save(&mut self, records: &[TradeRecord]) -> Result<(), JournalError> {
        let json = serde_json::to_string(records)
            .map_err(|e| JournalError::Serialization(format!("Failed to serialize trades: {e}")))?;
        self.store.set(&self.key, &json)
    }

    /// Delete the slot entirely.
    pub fn clear_slot(&mut self) -> Result<(), JournalError> {
        self.store.remove(&self.key)
    }
}

/// Human-readable name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
