use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::trade::{OperationType, Outcome, Setup, TimeFrame, Trend};

/// Headline numbers over the whole journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Total number of trades
    pub total_trades: usize,

    pub wins: usize,

    pub losses: usize,

    /// wins / total × 100, rounded to one decimal (0 when empty)
    pub win_rate: f64,

    /// Most frequent setup; `None` when the journal is empty
    pub most_used_setup: Option<Setup>,

    /// Most frequent operation type; `None` when the journal is empty
    pub most_common_operation: Option<OperationType>,
}

/// One point of the cumulative R timeline, oldest trade first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRPoint {
    pub trade_id: String,

    pub timestamp: DateTime<Utc>,

    /// Date label formatted for display
    pub label: String,

    /// R-value of this trade alone
    pub r_value: i32,

    /// Running total including this trade
    pub cumulative_r: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupPerformance {
    pub setup: Setup,
    pub total_r: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPerformance {
    /// Normalized (upper-cased) asset symbol
    pub asset: String,
    pub total_r: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPerformance {
    pub trend: Trend,
    pub wins: usize,
    pub losses: usize,
}

/// Count of trades for one value of a categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount<T> {
    pub category: T,
    pub count: usize,
}

/// Trade counts over the full domain of each categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributions {
    pub time_frames: Vec<CategoryCount<TimeFrame>>,
    pub outcomes: Vec<CategoryCount<Outcome>>,
    pub setups: Vec<CategoryCount<Setup>>,
}

/// Summary of the trades inside the trailing rollup window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRollup {
    /// Start of the window (inclusive)
    pub window_start: DateTime<Utc>,

    pub total_trades: usize,

    pub wins: usize,

    pub win_rate: f64,

    /// Win rate formatted for display, e.g. "66.7%"
    pub win_rate_label: String,

    /// Setup with the highest summed R inside the window
    pub best_setup: Setup,

    /// Normalized asset symbol traded most often
    pub most_operated_asset: String,

    pub predominant_trend: Trend,

    pub most_used_time_frame: TimeFrame,

    pub most_common_outcome: Outcome,
}

/// Everything the statistics dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub summary: SummaryMetrics,
    pub timeline: Vec<CumulativeRPoint>,
    pub setup_performance: Vec<SetupPerformance>,
    pub asset_performance: Vec<AssetPerformance>,
    pub trend_performance: Vec<TrendPerformance>,
    pub distributions: Distributions,
}
