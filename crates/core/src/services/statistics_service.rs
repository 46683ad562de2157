use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

use crate::models::analytics::{
    AssetPerformance, CategoryCount, CumulativeRPoint, Distributions, SetupPerformance,
    Statistics, SummaryMetrics, TrendPerformance, WeeklyRollup,
};
use crate::models::trade::{Category, Setup, TradeRecord, Trend};

/// Computes journal statistics: win rate, R totals, breakdowns, rollups.
///
/// Pure projections over a slice of records in storage order (newest first).
/// Nothing here mutates its input, and every ratio short-circuits on empty
/// input before dividing.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    rollup_window: Duration,
    date_label_format: String,
}

impl StatisticsService {
    pub fn new(rollup_window_days: u32, date_label_format: impl Into<String>) -> Self {
        Self {
            rollup_window: Duration::days(i64::from(rollup_window_days)),
            date_label_format: date_label_format.into(),
        }
    }

    /// Every dashboard figure at once.
    pub fn compute(&self, records: &[TradeRecord]) -> Statistics {
        Statistics {
            summary: self.summary(records),
            timeline: self.cumulative_r_timeline(records),
            setup_performance: self.setup_performance(records),
            asset_performance: self.asset_performance(records),
            trend_performance: self.trend_performance(records),
            distributions: self.distributions(records),
        }
    }

    /// Totals, win rate, most used setup and most common operation.
    pub fn summary(&self, records: &[TradeRecord]) -> SummaryMetrics {
        let total_trades = records.len();
        let wins = records.iter().filter(|r| r.is_win()).count();

        SummaryMetrics {
            total_trades,
            wins,
            losses: total_trades - wins,
            win_rate: win_rate(wins, total_trades),
            most_used_setup: most_frequent_in_domain(records.iter().map(|r| r.setup)),
            most_common_operation: most_frequent_in_domain(
                records.iter().map(|r| r.operation_type),
            ),
        }
    }

    /// Running R total, oldest trade first.
    pub fn cumulative_r_timeline(&self, records: &[TradeRecord]) -> Vec<CumulativeRPoint> {
        let mut cumulative_r = 0;
        records
            .iter()
            .rev()
            .map(|r| {
                let r_value = r.r_value();
                cumulative_r += r_value;
                CumulativeRPoint {
                    trade_id: r.id.clone(),
                    timestamp: r.timestamp,
                    label: r.timestamp.format(&self.date_label_format).to_string(),
                    r_value,
                    cumulative_r,
                }
            })
            .collect()
    }

    /// Summed R per setup, every setup present (zero if unused).
    pub fn setup_performance(&self, records: &[TradeRecord]) -> Vec<SetupPerformance> {
        setup_r_totals(records.iter())
            .into_iter()
            .map(|(setup, total_r)| SetupPerformance { setup, total_r })
            .collect()
    }

    /// Summed R per normalized asset, best first.
    ///
    /// Assets with equal totals keep the order in which they first appear
    /// chronologically.
    pub fn asset_performance(&self, records: &[TradeRecord]) -> Vec<AssetPerformance> {
        let mut totals: Vec<AssetPerformance> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records.iter().rev() {
            let asset = record.normalized_asset();
            match index.get(&asset) {
                Some(&i) => totals[i].total_r += record.r_value(),
                None => {
                    index.insert(asset.clone(), totals.len());
                    totals.push(AssetPerformance {
                        asset,
                        total_r: record.r_value(),
                    });
                }
            }
        }

        totals.sort_by(|a, b| b.total_r.cmp(&a.total_r));
        totals
    }

    /// Wins and losses for trades with and against the trend filter.
    pub fn trend_performance(&self, records: &[TradeRecord]) -> Vec<TrendPerformance> {
        Trend::ALL
            .iter()
            .map(|&trend| {
                let (wins, losses) = records
                    .iter()
                    .filter(|r| r.trend == trend)
                    .fold((0, 0), |(w, l), r| if r.is_win() { (w + 1, l) } else { (w, l + 1) });
                TrendPerformance {
                    trend,
                    wins,
                    losses,
                }
            })
            .collect()
    }

    /// Trade counts per time frame, outcome and setup.
    pub fn distributions(&self, records: &[TradeRecord]) -> Distributions {
        Distributions {
            time_frames: count_over_domain(records.iter().map(|r| r.time_frame)),
            outcomes: count_over_domain(records.iter().map(|r| r.outcome)),
            setups: count_over_domain(records.iter().map(|r| r.setup)),
        }
    }

    /// Summary of the trades in the trailing window ending at `now`.
    ///
    /// The window start (`now` minus the configured days) is inclusive. A
    /// window reaching past the earliest representable instant covers
    /// every trade. Returns `None` when no trade falls inside the window.
    pub fn weekly_rollup(&self, records: &[TradeRecord], now: DateTime<Utc>) -> Option<WeeklyRollup> {
        let window_start = now
            .checked_sub_signed(self.rollup_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window: Vec<&TradeRecord> = records
            .iter()
            .filter(|r| r.timestamp >= window_start)
            .collect();
        if window.is_empty() {
            return None;
        }

        let total_trades = window.len();
        let wins = window.iter().filter(|r| r.is_win()).count();
        let rate = win_rate(wins, total_trades);

        let best_setup = setup_r_totals(window.iter().copied())
            .into_iter()
            .fold(None::<(Setup, i32)>, |best, (setup, total)| match best {
                Some((_, best_total)) if best_total >= total => best,
                _ => Some((setup, total)),
            })
            .map(|(setup, _)| setup)?;

        Some(WeeklyRollup {
            window_start,
            total_trades,
            wins,
            win_rate: rate,
            win_rate_label: format!("{rate:.1}%"),
            best_setup,
            most_operated_asset: first_plurality(window.iter().map(|r| r.normalized_asset()))?,
            predominant_trend: first_plurality(window.iter().map(|r| r.trend))?,
            most_used_time_frame: first_plurality(window.iter().map(|r| r.time_frame))?,
            most_common_outcome: first_plurality(window.iter().map(|r| r.outcome))?,
        })
    }
}

impl Default for StatisticsService {
    fn default() -> Self {
        Self::new(7, "%d/%m/%Y")
    }
}

/// wins / total × 100, rounded to one decimal; 0 for an empty set.
pub fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = wins as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

fn setup_r_totals<'a>(records: impl Iterator<Item = &'a TradeRecord>) -> Vec<(Setup, i32)> {
    let mut totals: Vec<(Setup, i32)> = Setup::ALL.iter().map(|&s| (s, 0)).collect();
    for record in records {
        if let Some(entry) = totals.iter_mut().find(|(s, _)| *s == record.setup) {
            entry.1 += record.r_value();
        }
    }
    totals
}

fn count_over_domain<T: Category>(values: impl Iterator<Item = T>) -> Vec<CategoryCount<T>> {
    let mut counts: Vec<CategoryCount<T>> = T::ALL
        .iter()
        .map(|&category| CategoryCount { category, count: 0 })
        .collect();
    for value in values {
        if let Some(entry) = counts.iter_mut().find(|c| c.category == value) {
            entry.count += 1;
        }
    }
    counts
}

/// Most frequent value; ties go to the earlier value in enumeration order.
fn most_frequent_in_domain<T: Category>(values: impl Iterator<Item = T>) -> Option<T> {
    count_over_domain(values)
        .into_iter()
        .filter(|c| c.count > 0)
        .fold(None::<CategoryCount<T>>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        })
        .map(|c| c.category)
}

/// Most frequent value; ties go to the value encountered first.
fn first_plurality<T: Eq + Hash + Clone>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    let mut index: HashMap<T, usize> = HashMap::new();

    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    counts
        .into_iter()
        .fold(None::<(T, usize)>, |best, (value, count)| match best {
            Some((b, best_count)) if best_count >= count => Some((b, best_count)),
            _ => Some((value, count)),
        })
        .map(|(value, _)| value)
}
