pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use models::{
    analytics::{
        AssetPerformance, CumulativeRPoint, Distributions, SetupPerformance, Statistics,
        SummaryMetrics, TrendPerformance, WeeklyRollup,
    },
    settings::JournalSettings,
    trade::{NewTrade, SortDirection, TradeQuery, TradeRecord, TradeSortKey, TradeUpdate},
};
use services::{repository::TradeRepository, statistics_service::StatisticsService};
use storage::{backup, gateway::PersistenceGateway, store::KeyValueStore};

use errors::JournalError;

/// Main entry point for the Trading Journal core library.
///
/// Owns the session's trade repository and wires it to durable storage and
/// the statistics service. Every mutation updates memory first, then writes
/// the full journal back to the storage slot. A failed write is logged and
/// leaves the in-memory state as the only copy until the next successful save.
#[must_use]
pub struct TradingJournal {
    repository: TradeRepository,
    gateway: PersistenceGateway,
    statistics_service: StatisticsService,
    settings: JournalSettings,
    /// Set when the last durable write failed.
    unsaved: bool,
    /// Set when the last load found stored data it could not read.
    load_failed: bool,
}

impl std::fmt::Debug for TradingJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingJournal")
            .field("trades", &self.repository.len())
            .field("ready", &self.repository.is_ready())
            .field("settings", &self.settings)
            .field("unsaved", &self.unsaved)
            .field("load_failed", &self.load_failed)
            .finish()
    }
}

impl TradingJournal {
    /// Create a journal over `store` without reading it yet.
    /// Nothing is written until [`load`](Self::load) has run.
    pub fn new(store: Box<dyn KeyValueStore>, settings: JournalSettings) -> Result<Self, JournalError> {
        settings.validate()?;
        let gateway = PersistenceGateway::new(store, settings.storage_key.clone());
        let statistics_service =
            StatisticsService::new(settings.rollup_window_days, settings.date_label_format.clone());

        Ok(Self {
            repository: TradeRepository::new(),
            gateway,
            statistics_service,
            settings,
            unsaved: false,
            load_failed: false,
        })
    }

    /// Create a journal and load its stored trades.
    pub fn open(store: Box<dyn KeyValueStore>, settings: JournalSettings) -> Result<Self, JournalError> {
        let mut journal = Self::new(store, settings)?;
        journal.load();
        Ok(journal)
    }

    /// Read the storage slot into memory and enable saving.
    /// Unreadable data is logged and results in an empty journal; see
    /// [`load_failed`](Self::load_failed). Returns the number of trades loaded.
    pub fn load(&mut self) -> usize {
        let records = match self.gateway.try_load() {
            Ok(records) => {
                self.load_failed = false;
                records
            }
            Err(e) => {
                tracing::error!(key = %self.gateway.key(), error = %e, "Failed to load trades from storage");
                tracing::warn!(
                    key = %self.gateway.key(),
                    "Starting with an empty journal; the next save replaces the unreadable stored data"
                );
                self.load_failed = true;
                Vec::new()
            }
        };
        let count = records.len();
        self.repository.load_from(records);
        self.unsaved = false;
        tracing::info!(count, key = %self.gateway.key(), "Loaded trades");
        count
    }

    /// Whether the initial load has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.repository.is_ready()
    }

    /// Returns `true` if the last load found stored data it could not read.
    /// The journal then starts empty and its next save overwrites that data,
    /// so a host can offer an export or a warning first.
    #[must_use]
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    // ── Trade Management ────────────────────────────────────────────

    /// Record a new trade. Returns the stored record with its id and timestamp.
    pub fn add_trade(&mut self, trade: NewTrade) -> TradeRecord {
        let record = self.repository.add(trade);
        tracing::debug!(id = %record.id, asset = %record.asset, "Added trade");
        self.persist();
        record
    }

    /// Apply a partial update. Unknown ids are a no-op and return `false`.
    pub fn update_trade(&mut self, id: &str, update: TradeUpdate) -> bool {
        let found = self.repository.update(id, update);
        if found {
            tracing::debug!(id, "Updated trade");
            self.persist();
        } else {
            tracing::debug!(id, "Update ignored, trade not found");
        }
        found
    }

    /// Delete a trade permanently. Unknown ids are a no-op and return `false`.
    pub fn delete_trade(&mut self, id: &str) -> bool {
        let found = self.repository.delete(id);
        if found {
            tracing::debug!(id, "Deleted trade");
            self.persist();
        } else {
            tracing::debug!(id, "Delete ignored, trade not found");
        }
        found
    }

    /// Replace the whole journal with `records`.
    /// Invalid input is rejected and leaves the journal untouched.
    pub fn import_trades(&mut self, records: Vec<TradeRecord>) -> Result<usize, JournalError> {
        match self.repository.import_all(records) {
            Ok(count) => {
                tracing::info!(count, "Imported trades");
                self.persist();
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected trade import");
                Err(e)
            }
        }
    }

    /// Parse a JSON backup and replace the whole journal with it.
    pub fn import_json(&mut self, json: &str) -> Result<usize, JournalError> {
        let records = backup::parse_import(json).map_err(|e| {
            tracing::warn!(error = %e, "Rejected backup document");
            e
        })?;
        self.import_trades(records)
    }

    /// Remove every trade.
    pub fn clear_trades(&mut self) {
        let count = self.repository.len();
        self.repository.clear();
        tracing::info!(count, "Cleared all trades");
        self.persist();
    }

    /// Get a single trade by its id.
    #[must_use]
    pub fn get_trade(&self, id: &str) -> Option<&TradeRecord> {
        self.repository.get(id)
    }

    /// All trades, newest first.
    #[must_use]
    pub fn trades(&self) -> &[TradeRecord] {
        self.repository.records()
    }

    #[must_use]
    pub fn trade_count(&self) -> usize {
        self.repository.len()
    }

    // ── Search & Sorting ────────────────────────────────────────────

    /// Search trades by asset, setup and comment (case-insensitive).
    #[must_use]
    pub fn search_trades(&self, query: &str) -> Vec<&TradeRecord> {
        self.repository.search(query)
    }

    /// Get trades sorted by one column.
    #[must_use]
    pub fn get_trades_sorted(&self, key: TradeSortKey, direction: SortDirection) -> Vec<&TradeRecord> {
        self.repository.sorted(key, direction)
    }

    /// Search and sort in one call, as the trade table does.
    #[must_use]
    pub fn query_trades(&self, query: &TradeQuery) -> Vec<&TradeRecord> {
        self.repository.query(query)
    }

    // ── Statistics ──────────────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> SummaryMetrics {
        self.statistics_service.summary(self.trades())
    }

    #[must_use]
    pub fn cumulative_r_timeline(&self) -> Vec<CumulativeRPoint> {
        self.statistics_service.cumulative_r_timeline(self.trades())
    }

    #[must_use]
    pub fn setup_performance(&self) -> Vec<SetupPerformance> {
        self.statistics_service.setup_performance(self.trades())
    }

    #[must_use]
    pub fn asset_performance(&self) -> Vec<AssetPerformance> {
        self.statistics_service.asset_performance(self.trades())
    }

    #[must_use]
    pub fn trend_performance(&self) -> Vec<TrendPerformance> {
        self.statistics_service.trend_performance(self.trades())
    }

    #[must_use]
    pub fn distributions(&self) -> Distributions {
        self.statistics_service.distributions(self.trades())
    }

    /// Rollup of the trailing window ending now. `None` when it holds no trades.
    #[must_use]
    pub fn weekly_rollup(&self) -> Option<WeeklyRollup> {
        self.weekly_rollup_at(Utc::now())
    }

    /// Rollup of the trailing window ending at `now`.
    #[must_use]
    pub fn weekly_rollup_at(&self, now: DateTime<Utc>) -> Option<WeeklyRollup> {
        self.statistics_service.weekly_rollup(self.trades(), now)
    }

    /// All dashboard statistics.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.statistics_service.compute(self.trades())
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all trades as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, JournalError> {
        backup::export_json(self.trades())
    }

    /// Default file name for exported backups.
    #[must_use]
    pub fn export_file_name(&self) -> &str {
        &self.settings.export_file_name
    }

    /// Write a backup into `dir` under the configured file name (native only).
    /// Returns the path written.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn export_to_dir(&self, dir: impl AsRef<std::path::Path>) -> Result<std::path::PathBuf, JournalError> {
        let path = dir.as_ref().join(&self.settings.export_file_name);
        backup::write_export(&path, self.trades())?;
        tracing::info!(path = %path.display(), count = self.trade_count(), "Exported trades");
        Ok(path)
    }

    /// Replace the journal with the contents of a backup file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn import_from_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<usize, JournalError> {
        let records = backup::read_import(path).map_err(|e| {
            tracing::warn!(error = %e, "Rejected backup file");
            e
        })?;
        self.import_trades(records)
    }

    // ── Settings & Save State ───────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &JournalSettings {
        &self.settings
    }

    /// Returns `true` if the last durable write failed.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Write the current journal to storage, surfacing any failure.
    pub fn retry_save(&mut self) -> Result<(), JournalError> {
        if !self.repository.is_ready() {
            return Err(JournalError::Storage(
                "Journal has not been loaded yet; refusing to overwrite stored trades".into(),
            ));
        }
        self.gateway.save(self.repository.records())?;
        self.unsaved = false;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn persist(&mut self) {
        if !self.repository.is_ready() {
            tracing::debug!("Skipping save, journal not loaded yet");
            return;
        }
        match self.gateway.save(self.repository.records()) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save trades to storage");
                self.unsaved = true;
            }
        }
    }
}
