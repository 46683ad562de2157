// ═══════════════════════════════════════════════════════════════════
// Integration Tests — TradingJournal facade over real stores
// ═══════════════════════════════════════════════════════════════════

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, Utc};
use serde_json::json;
use trading_journal_core::errors::JournalError;
use trading_journal_core::models::settings::JournalSettings;
use trading_journal_core::models::trade::{
    Location, NewTrade, OperationType, Outcome, Setup, SortDirection, TimeFrame, TradeQuery,
    TradeResult, TradeSortKey, TradeUpdate, TrailingStop, Trend,
};
use trading_journal_core::storage::store::{FileStore, KeyValueStore, MemoryStore};
use trading_journal_core::TradingJournal;

// ═══════════════════════════════════════════════════════════════════
// Test stores
// ═══════════════════════════════════════════════════════════════════

/// Memory store whose contents stay observable after being boxed into a journal.
#[derive(Clone, Default)]
struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
    writes: Rc<RefCell<usize>>,
}

impl SharedStore {
    fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).unwrap()
    }

    fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        *self.writes.borrow_mut() += 1;
        self.inner.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), JournalError> {
        self.inner.borrow_mut().remove(key)
    }
}

/// A store whose writes fail until switched back on.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: SharedStore,
    failing: Rc<RefCell<bool>>,
}

impl FlakyStore {
    fn set_failing(&self, failing: bool) {
        *self.failing.borrow_mut() = failing;
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        if *self.failing.borrow() {
            return Err(JournalError::Storage("quota exceeded".into()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), JournalError> {
        self.inner.remove(key)
    }
}

const KEY: &str = "tradingJournalTrades";

fn new_trade(asset: &str, setup: Setup, outcome: Outcome) -> NewTrade {
    NewTrade::new(
        asset,
        OperationType::Buy,
        setup,
        Trend::WithFilter,
        Location::NearFilter,
        TimeFrame::M5,
        outcome,
    )
}

fn open(store: impl KeyValueStore + 'static) -> TradingJournal {
    TradingJournal::open(Box::new(store), JournalSettings::default()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════

mod lifecycle {
    use super::*;

    #[test]
    fn open_empty_store() {
        let journal = open(MemoryStore::new());
        assert!(journal.is_ready());
        assert_eq!(journal.trade_count(), 0);
        assert!(!journal.has_unsaved_changes());
        assert!(!journal.load_failed());
    }

    #[test]
    fn invalid_settings_rejected() {
        let settings = JournalSettings {
            rollup_window_days: 0,
            ..JournalSettings::default()
        };
        assert!(TradingJournal::new(Box::new(MemoryStore::new()), settings).is_err());
    }

    #[test]
    fn mutations_before_load_are_not_saved() {
        let store = SharedStore::default();
        store.inner.borrow_mut().set(KEY, "[]").unwrap();
        let mut journal =
            TradingJournal::new(Box::new(store.clone()), JournalSettings::default()).unwrap();
        assert!(!journal.is_ready());

        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        journal.clear_trades();
        assert_eq!(store.writes(), 0);
        assert_eq!(store.raw(KEY).as_deref(), Some("[]"));
        assert!(journal.retry_save().is_err());
    }

    #[test]
    fn load_replaces_pre_load_state() {
        let store = SharedStore::default();
        let mut journal =
            TradingJournal::new(Box::new(store.clone()), JournalSettings::default()).unwrap();
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        assert_eq!(journal.load(), 0);
        assert_eq!(journal.trade_count(), 0);
        assert!(journal.is_ready());
    }

    #[test]
    fn every_mutation_is_written() {
        let store = SharedStore::default();
        let mut journal = open(store.clone());

        let first = journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        assert_eq!(store.writes(), 1);
        journal.add_trade(new_trade("WDO", Setup::Pullback, Outcome::Loss));
        assert_eq!(store.writes(), 2);
        assert!(journal.update_trade(&first.id, TradeUpdate::new().comment("edited")));
        assert_eq!(store.writes(), 3);
        assert!(journal.delete_trade(&first.id));
        assert_eq!(store.writes(), 4);
        journal.clear_trades();
        assert_eq!(store.writes(), 5);
        assert_eq!(store.raw(KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn not_found_is_noop_without_write() {
        let store = SharedStore::default();
        let mut journal = open(store.clone());
        assert!(!journal.update_trade("nope", TradeUpdate::new().comment("x")));
        assert!(!journal.delete_trade("nope"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn reopen_sees_saved_trades() {
        let store = SharedStore::default();
        let added = {
            let mut journal = open(store.clone());
            journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::TwoToOne));
            journal.add_trade(new_trade("wdo", Setup::Pullback, Outcome::Loss))
        };

        let journal = open(store);
        assert_eq!(journal.trade_count(), 2);
        assert_eq!(journal.trades()[0], added);
        assert_eq!(journal.get_trade(&added.id).unwrap().result, TradeResult::Loss);
    }

    #[test]
    fn corrupt_slot_opens_empty() {
        let journal = open(MemoryStore::with_entry(KEY, "definitely not json"));
        assert!(journal.is_ready());
        assert!(journal.load_failed());
        assert_eq!(journal.trade_count(), 0);
    }

    #[test]
    fn reload_after_repair_clears_load_failure() {
        let store = SharedStore::default();
        store.inner.borrow_mut().set(KEY, "[{\"id\": 1}]").unwrap();
        let mut journal = open(store.clone());
        assert!(journal.load_failed());

        store.inner.borrow_mut().set(KEY, "[]").unwrap();
        journal.load();
        assert!(!journal.load_failed());
    }

    #[test]
    fn flag_spelled_trailing_stop_loads_whole_slot() {
        let raw = json!([
            {
                "id": "flagged",
                "date": "2024-06-01T12:00:00.000Z",
                "asset": "winfut",
                "operationType": "buy",
                "setup": "pullback",
                "trend": "with_m200",
                "location": "near_m200",
                "timeFrame": "M5",
                "trailingStopUsed": false,
                "outcome": "2:1"
            },
            {
                "id": "both",
                "date": "2024-06-01T11:00:00.000Z",
                "asset": "wdofut",
                "operationType": "sell",
                "setup": "breakout",
                "trend": "against_m200",
                "location": "far_from_m200",
                "timeFrame": "H1",
                "trailingStop": "B/B",
                "trailingStopUsed": "false",
                "result": "loss",
                "outcome": "-1"
            }
        ])
        .to_string();
        let journal = open(MemoryStore::with_entry(KEY, raw));
        assert!(!journal.load_failed());
        assert_eq!(journal.trade_count(), 2);
        assert_eq!(
            journal.get_trade("both").unwrap().trailing_stop,
            TrailingStop::BarByBar
        );
    }

    #[test]
    fn legacy_slot_is_migrated() {
        let raw = json!([{
            "id": "legacy",
            "date": "2024-06-01T12:00:00.000Z",
            "asset": "winfut",
            "operationType": "sell",
            "setup": "breakout",
            "trend": "against_m200",
            "location": "far_from_m200",
            "timeFrame": "M15",
            "outcome": "-1",
            "comment": ""
        }])
        .to_string();
        let journal = open(MemoryStore::with_entry(KEY, raw));
        let t = journal.get_trade("legacy").unwrap();
        assert_eq!(t.result, TradeResult::Loss);
        assert_eq!(journal.summary().wins, 0);
    }

    #[test]
    fn custom_storage_key() {
        let store = SharedStore::default();
        let settings = JournalSettings {
            storage_key: "journal-v2".into(),
            ..JournalSettings::default()
        };
        let mut journal = TradingJournal::open(Box::new(store.clone()), settings).unwrap();
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        assert!(store.raw("journal-v2").is_some());
        assert!(store.raw(KEY).is_none());
    }

    #[test]
    fn file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut journal = open(FileStore::new(dir.path()));
            journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::ThreeToOne));
        }
        let journal = open(FileStore::new(dir.path()));
        assert_eq!(journal.trade_count(), 1);
        assert_eq!(journal.summary().win_rate, 100.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Write failures
// ═══════════════════════════════════════════════════════════════════

mod write_failures {
    use super::*;

    #[test]
    fn failed_save_keeps_memory_and_flags_unsaved() {
        let store = FlakyStore::default();
        let mut journal = open(store.clone());
        store.set_failing(true);

        let added = journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        assert_eq!(journal.trade_count(), 1);
        assert_eq!(journal.trades()[0], added);
        assert!(journal.has_unsaved_changes());
        assert!(store.inner.raw(KEY).is_none());
    }

    #[test]
    fn retry_save_surfaces_error_then_succeeds() {
        let store = FlakyStore::default();
        let mut journal = open(store.clone());
        store.set_failing(true);
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));

        assert!(matches!(journal.retry_save(), Err(JournalError::Storage(_))));
        assert!(journal.has_unsaved_changes());

        store.set_failing(false);
        journal.retry_save().unwrap();
        assert!(!journal.has_unsaved_changes());
        assert!(store.inner.raw(KEY).unwrap().contains("WIN"));
    }

    #[test]
    fn next_successful_mutation_clears_flag() {
        let store = FlakyStore::default();
        let mut journal = open(store.clone());
        store.set_failing(true);
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        store.set_failing(false);
        journal.add_trade(new_trade("WDO", Setup::Breakout, Outcome::Loss));
        assert!(!journal.has_unsaved_changes());

        let reopened = open(store.inner.clone());
        assert_eq!(reopened.trade_count(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Import / Export
// ═══════════════════════════════════════════════════════════════════

mod import_export {
    use super::*;

    #[test]
    fn export_then_import_into_fresh_journal() {
        let mut source = open(MemoryStore::new());
        source.add_trade(new_trade("WIN", Setup::Breakout, Outcome::TwoToOne));
        source.add_trade(new_trade("WDO", Setup::Pullback, Outcome::Loss).with_comment("late"));
        let json = source.export_json().unwrap();

        let mut target = open(MemoryStore::new());
        assert_eq!(target.import_json(&json).unwrap(), 2);
        assert_eq!(target.trades(), source.trades());
    }

    #[test]
    fn invalid_import_leaves_journal_untouched() {
        let store = SharedStore::default();
        let mut journal = open(store.clone());
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        let before = journal.trades().to_vec();
        let writes = store.writes();

        let bad = json!([{ "id": "", "asset": "X" }]).to_string();
        assert!(journal.import_json(&bad).is_err());
        assert!(journal.import_json("not json").is_err());
        assert!(journal.import_json(r#"{"id": "a"}"#).is_err());

        assert_eq!(journal.trades(), before.as_slice());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn import_replaces_and_persists() {
        let store = SharedStore::default();
        let mut journal = open(store.clone());
        journal.add_trade(new_trade("OLD", Setup::Breakout, Outcome::OneToOne));

        let raw = json!([{
            "id": "imported",
            "date": "2025-02-01T09:00:00Z",
            "asset": "petr4",
            "operationType": "buy",
            "setup": "pullback",
            "trend": "with_m200",
            "location": "near_m200",
            "timeFrame": "H1",
            "trailingStop": "B/B",
            "result": "gain",
            "outcome": "4:1",
            "comment": "from backup"
        }])
        .to_string();
        assert_eq!(journal.import_json(&raw).unwrap(), 1);
        assert_eq!(journal.trade_count(), 1);

        let reopened = open(store);
        assert_eq!(reopened.trades()[0].id, "imported");
    }

    #[test]
    fn export_to_dir_uses_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));

        let path = journal.export_to_dir(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("trading_journal_backup.json"));
        assert_eq!(journal.export_file_name(), "trading_journal_backup.json");

        let mut restored = open(MemoryStore::new());
        assert_eq!(restored.import_from_file(&path).unwrap(), 1);
        assert_eq!(restored.trades(), journal.trades());
    }

    #[test]
    fn import_from_missing_file_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        assert!(journal.import_from_file(dir.path().join("missing.json")).is_err());
        assert_eq!(journal.trade_count(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Statistics through the facade
// ═══════════════════════════════════════════════════════════════════

mod statistics {
    use super::*;

    #[test]
    fn empty_journal_defaults() {
        let journal = open(MemoryStore::new());
        let stats = journal.statistics();
        assert_eq!(stats.summary.total_trades, 0);
        assert_eq!(stats.summary.win_rate, 0.0);
        assert!(stats.timeline.is_empty());
        assert!(stats.asset_performance.is_empty());
        assert_eq!(stats.setup_performance.len(), 2);
        assert!(journal.weekly_rollup().is_none());
    }

    #[test]
    fn fresh_trades_appear_in_weekly_rollup() {
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("winfut", Setup::Pullback, Outcome::TwoToOne));
        journal.add_trade(new_trade("WINFUT", Setup::Breakout, Outcome::Loss));

        let rollup = journal.weekly_rollup().unwrap();
        assert_eq!(rollup.total_trades, 2);
        assert_eq!(rollup.win_rate_label, "50.0%");
        assert_eq!(rollup.best_setup, Setup::Pullback);
        assert_eq!(rollup.most_operated_asset, "WINFUT");

        assert!(journal.weekly_rollup_at(Utc::now() + Duration::days(30)).is_none());
    }

    #[test]
    fn case_variants_share_one_asset_total() {
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("winfut", Setup::Pullback, Outcome::TwoToOne));
        journal.add_trade(new_trade("WINFUT", Setup::Breakout, Outcome::Loss));
        let perf = journal.asset_performance();
        assert_eq!(perf.len(), 1);
        assert_eq!(perf[0].asset, "WINFUT");
        assert_eq!(perf[0].total_r, 1);
    }

    #[test]
    fn facade_projections_agree() {
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("A", Setup::Breakout, Outcome::OneToOne));
        journal.add_trade(new_trade("B", Setup::Pullback, Outcome::Loss));
        journal.add_trade(new_trade("A", Setup::Pullback, Outcome::FourToOne));

        let stats = journal.statistics();
        assert_eq!(stats.summary, journal.summary());
        assert_eq!(stats.setup_performance, journal.setup_performance());
        assert_eq!(stats.trend_performance, journal.trend_performance());
        assert_eq!(stats.distributions, journal.distributions());
        let timeline = journal.cumulative_r_timeline();
        assert_eq!(timeline.last().unwrap().cumulative_r, 4);
        assert_eq!(timeline[0].r_value, 1);
    }

    #[test]
    fn table_queries() {
        let mut journal = open(MemoryStore::new());
        journal.add_trade(new_trade("WIN", Setup::Breakout, Outcome::OneToOne));
        journal.add_trade(new_trade("WDO", Setup::Pullback, Outcome::Loss).with_comment("news spike"));

        assert_eq!(journal.search_trades("spike").len(), 1);
        let by_asset = journal.get_trades_sorted(TradeSortKey::Asset, SortDirection::Asc);
        assert_eq!(by_asset[0].asset, "WDO");
        let q = TradeQuery {
            search: "w".into(),
            ..TradeQuery::default()
        };
        assert_eq!(journal.query_trades(&q).len(), 2);
    }
}
