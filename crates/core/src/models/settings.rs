use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::errors::JournalError;

/// Storage slot used by journals saved before settings existed.
pub const DEFAULT_STORAGE_KEY: &str = "tradingJournalTrades";

/// File name offered for JSON backups.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "trading_journal_backup.json";

/// Longest accepted rollup window (about a century).
pub const MAX_ROLLUP_WINDOW_DAYS: u32 = 36_500;

/// User-configurable settings for a journal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    /// Key of the single slot holding the trade array in the key-value store.
    pub storage_key: String,

    /// Default file name for exported backups.
    pub export_file_name: String,

    /// Length of the trailing window used by the weekly rollup, in days.
    pub rollup_window_days: u32,

    /// `chrono` format string for the date labels of the cumulative R timeline.
    pub date_label_format: String,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            rollup_window_days: 7,
            date_label_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl JournalSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, JournalError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the journal cannot operate with.
    pub fn validate(&self) -> Result<(), JournalError> {
        if self.storage_key.trim().is_empty() {
            return Err(JournalError::ValidationError(
                "storage_key must not be empty".into(),
            ));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(JournalError::ValidationError(
                "export_file_name must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.date_label_format).any(|item| matches!(item, Item::Error)) {
            return Err(JournalError::ValidationError(format!(
                "Invalid date_label_format '{}'",
                self.date_label_format
            )));
        }
        if self.rollup_window_days == 0 || self.rollup_window_days > MAX_ROLLUP_WINDOW_DAYS {
            return Err(JournalError::ValidationError(format!(
                "rollup_window_days must be between 1 and {MAX_ROLLUP_WINDOW_DAYS}, got {}",
                self.rollup_window_days
            )));
        }
        Ok(())
    }
}
