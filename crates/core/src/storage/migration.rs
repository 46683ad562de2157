use serde_json::{Map, Value};

use crate::errors::JournalError;
use crate::models::trade::{Category, Outcome, TradeRecord, TradeResult, TrailingStop};

/// JSON key of the win/loss tag (added after the first journal version).
pub const RESULT_KEY: &str = "result";

/// JSON key of the trailing-stop tag (added after the first journal version).
pub const TRAILING_STOP_KEY: &str = "trailingStop";

/// Alternate spelling of `trailingStop` accepted on input.
pub const TRAILING_STOP_ALIAS: &str = "trailingStopUsed";

/// Bring a raw stored record up to the current shape.
///
/// Older journals predate `result` and `trailingStop`. Missing `result` is
/// synthesized from `outcome` (loss iff `"-1"`), and a missing trailing-stop
/// tag defaults to `"T/F"`. The `trailingStopUsed` spelling is folded into
/// `trailingStop`, and dropped when both are present. Records that already
/// carry both current fields, and values that are not objects, come back
/// unchanged.
///
/// Idempotent: `migrate_value(migrate_value(v)) == migrate_value(v)`.
pub fn migrate_value(raw: Value) -> Value {
    match raw {
        Value::Object(map) => Value::Object(migrate_object(map)),
        other => other,
    }
}

fn migrate_object(mut map: Map<String, Value>) -> Map<String, Value> {
    if !map.contains_key(RESULT_KEY) {
        let is_loss = map.get("outcome").and_then(Value::as_str) == Some(Outcome::Loss.as_str());
        let result = if is_loss {
            TradeResult::Loss
        } else {
            TradeResult::Gain
        };
        map.insert(RESULT_KEY.to_string(), Value::from(result.as_str()));
    }

    match map.remove(TRAILING_STOP_ALIAS) {
        // `trailingStop` wins when both keys are present
        Some(_) if map.contains_key(TRAILING_STOP_KEY) => {}
        Some(alias) => {
            map.insert(TRAILING_STOP_KEY.to_string(), trailing_stop_from_flag(alias));
        }
        None => {}
    }

    if !map.contains_key(TRAILING_STOP_KEY) {
        map.insert(
            TRAILING_STOP_KEY.to_string(),
            Value::from(TrailingStop::default().as_str()),
        );
    }

    map
}

/// Map a `trailingStopUsed` value onto the trailing-stop tag.
///
/// The flag form reads `false` as the default trail (`"T/F"`) and `true` as
/// bar by bar (`"B/B"`), both as JSON booleans and as strings. Tag strings
/// pass through; anything else is kept so decoding reports it.
fn trailing_stop_from_flag(value: Value) -> Value {
    let flag = match &value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        _ => None,
    };
    match flag {
        Some(false) => Value::from(TrailingStop::TrailFilter.as_str()),
        Some(true) => Value::from(TrailingStop::BarByBar.as_str()),
        None => value,
    }
}

/// Migrate a raw stored record and decode it into a typed `TradeRecord`.
pub fn migrate(raw: Value) -> Result<TradeRecord, JournalError> {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<missing id>")
        .to_string();

    serde_json::from_value(migrate_value(raw)).map_err(|e| {
        JournalError::Deserialization(format!("Failed to decode trade '{id}': {e}"))
    })
}
