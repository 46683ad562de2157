use thiserror::Error;

/// Unified error type for the entire trading-journal-core library.
/// Every fallible public function returns `Result<T, JournalError>`.
///
/// None of these are fatal: load failures fall back to an empty journal,
/// save failures keep the in-memory state, and rejected imports leave the
/// existing collection untouched.
#[derive(Debug, Error)]
pub enum JournalError {
    // ── Storage / Serialization ─────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Trade validation failed: {0}")]
    ValidationError(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for JournalError {
    fn from(e: std::io::Error) -> Self {
        JournalError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(e: serde_json::Error) -> Self {
        JournalError::Deserialization(e.to_string())
    }
}
