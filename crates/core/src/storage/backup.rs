use std::collections::HashSet;

use serde_json::Value;

use crate::errors::JournalError;
use crate::models::trade::TradeRecord;

use super::gateway::json_kind;
use super::migration;

/// Serialize trades as a pretty-printed JSON array (same shape as storage).
pub fn export_json(records: &[TradeRecord]) -> Result<String, JournalError> {
    serde_json::to_string_pretty(records)
        .map_err(|e| JournalError::Serialization(format!("Failed to serialize trades to JSON: {e}")))
}

/// Parse and validate a backup document.
///
/// The top level must be an array of objects, each with a non-empty string
/// `id` and `asset`, and ids must be unique. Every element is migrated, so
/// backups taken before `result`/`trailingStop` existed still import.
/// Any problem rejects the whole document.
pub fn parse_import(json: &str) -> Result<Vec<TradeRecord>, JournalError> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(JournalError::ValidationError(format!(
                "Backup must be a JSON array of trades, found {}",
                json_kind(&other)
            )))
        }
    };

    validate_items(&items)?;

    items.into_iter().map(migration::migrate).collect()
}

fn validate_items(items: &[Value]) -> Result<(), JournalError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = required_text(item, "id", index)?;
        required_text(item, "asset", index)?;
        if !seen.insert(id) {
            return Err(JournalError::ValidationError(format!(
                "Duplicate trade id '{id}' at index {index}"
            )));
        }
    }
    Ok(())
}

fn required_text<'a>(item: &'a Value, field: &str, index: usize) -> Result<&'a str, JournalError> {
    let object = item.as_object().ok_or_else(|| {
        JournalError::ValidationError(format!(
            "Trade at index {index} must be an object, found {}",
            json_kind(item)
        ))
    })?;

    match object.get(field).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(JournalError::ValidationError(format!(
            "Trade at index {index} is missing a non-empty '{field}'"
        ))),
    }
}

/// Write a backup file (native only).
#[cfg(not(target_arch = "wasm32"))]
pub fn write_export(path: impl AsRef<std::path::Path>, records: &[TradeRecord]) -> Result<(), JournalError> {
    let json = export_json(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read and validate a backup file (native only).
#[cfg(not(target_arch = "wasm32"))]
pub fn read_import(path: impl AsRef<std::path::Path>) -> Result<Vec<TradeRecord>, JournalError> {
    let json = std::fs::read_to_string(path)?;
    parse_import(&json)
}
