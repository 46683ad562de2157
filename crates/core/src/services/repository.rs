use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::JournalError;
use crate::models::trade::{
    Category, NewTrade, SortDirection, TradeQuery, TradeRecord, TradeSortKey, TradeUpdate,
};

/// Owns the canonical, newest-first sequence of journal entries.
///
/// Pure in-memory state: durable saves are the caller's job. The `ready`
/// flag records whether the durable copy has been loaded; saving before
/// that would overwrite stored trades with an empty default.
#[derive(Debug, Clone, Default)]
pub struct TradeRepository {
    records: Vec<TradeRecord>,
    ready: bool,
}

impl TradeRepository {
    /// Empty repository, not yet ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the initially loaded records and mark the repository ready.
    pub fn load_from(&mut self, records: Vec<TradeRecord>) {
        self.records = records;
        self.ready = true;
    }

    /// Whether the initial load has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&TradeRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create a record with a fresh id and the current time, newest first.
    pub fn add(&mut self, trade: NewTrade) -> TradeRecord {
        let record = TradeRecord::from_new(self.fresh_id(), Utc::now(), trade);
        self.records.insert(0, record.clone());
        record
    }

    /// Shallow-merge `update` into the record with `id`.
    /// Returns `false` (and changes nothing) if no such record exists.
    pub fn update(&mut self, id: &str, update: TradeUpdate) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.apply(update);
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`. Returns `false` if it was not present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Replace the whole collection.
    ///
    /// Every record needs a non-empty `id` and `asset`, and ids must be
    /// unique. On failure the current collection is left untouched.
    pub fn import_all(&mut self, records: Vec<TradeRecord>) -> Result<usize, JournalError> {
        Self::validate_import(&records)?;
        let count = records.len();
        self.records = records;
        Ok(count)
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // ── Search & Sorting ────────────────────────────────────────────

    /// Records whose asset, setup or comment contains `query` (case-insensitive).
    /// Keeps storage order. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&TradeRecord> {
        let q = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                q.is_empty()
                    || r.asset.to_lowercase().contains(&q)
                    || r.setup.as_str().contains(&q)
                    || r.comment.to_lowercase().contains(&q)
            })
            .collect()
    }

    /// All records sorted by one column. The sort is stable.
    pub fn sorted(&self, key: TradeSortKey, direction: SortDirection) -> Vec<&TradeRecord> {
        let mut records: Vec<&TradeRecord> = self.records.iter().collect();
        sort_records(&mut records, key, direction);
        records
    }

    /// Search, then sort.
    pub fn query(&self, query: &TradeQuery) -> Vec<&TradeRecord> {
        let mut records = self.search(&query.search);
        sort_records(&mut records, query.sort_key, query.direction);
        records
    }

    // ── Internal ────────────────────────────────────────────────────

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn validate_import(records: &[TradeRecord]) -> Result<(), JournalError> {
        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(JournalError::ValidationError(format!(
                    "Trade at index {index} has an empty id"
                )));
            }
            if record.asset.trim().is_empty() {
                return Err(JournalError::ValidationError(format!(
                    "Trade '{}' has an empty asset",
                    record.id
                )));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(JournalError::ValidationError(format!(
                    "Duplicate trade id '{}'",
                    record.id
                )));
            }
        }
        Ok(())
    }
}

fn sort_records(records: &mut [&TradeRecord], key: TradeSortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = compare_by(a, b, key);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Enum columns compare by their stored string, like the rendered table.
fn compare_by(a: &TradeRecord, b: &TradeRecord, key: TradeSortKey) -> Ordering {
    match key {
        TradeSortKey::Date => a.timestamp.cmp(&b.timestamp),
        TradeSortKey::Asset => a.asset.cmp(&b.asset),
        TradeSortKey::OperationType => a.operation_type.as_str().cmp(b.operation_type.as_str()),
        TradeSortKey::Setup => a.setup.as_str().cmp(b.setup.as_str()),
        TradeSortKey::TrailingStop => a.trailing_stop.as_str().cmp(b.trailing_stop.as_str()),
        TradeSortKey::TimeFrame => a.time_frame.as_str().cmp(b.time_frame.as_str()),
        TradeSortKey::Result => a.result.as_str().cmp(b.result.as_str()),
        TradeSortKey::Outcome => a.outcome.as_str().cmp(b.outcome.as_str()),
    }
}
