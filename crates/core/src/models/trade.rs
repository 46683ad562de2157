use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed set of categorical values with a stable enumeration order.
///
/// The order of `ALL` is the order used for zero-initialized breakdowns
/// and for breaking ties between equally frequent values.
pub trait Category: Copy + Eq + std::hash::Hash + 'static {
    /// Every value of the domain, in enumeration order.
    const ALL: &'static [Self];

    /// The value as stored in JSON.
    fn as_str(&self) -> &'static str;
}

/// Direction of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Buy,
    Sell,
}

impl Category for OperationType {
    const ALL: &'static [Self] = &[OperationType::Buy, OperationType::Sell];

    fn as_str(&self) -> &'static str {
        match self {
            OperationType::Buy => "buy",
            OperationType::Sell => "sell",
        }
    }
}

/// Chart pattern that triggered the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Setup {
    Breakout,
    Pullback,
}

impl Category for Setup {
    const ALL: &'static [Self] = &[Setup::Breakout, Setup::Pullback];

    fn as_str(&self) -> &'static str {
        match self {
            Setup::Breakout => "breakout",
            Setup::Pullback => "pullback",
        }
    }
}

/// Entry direction relative to the reference moving-average filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "with_m200", alias = "with_trend_filter")]
    WithFilter,
    #[serde(rename = "against_m200", alias = "against_trend_filter")]
    AgainstFilter,
}

impl Category for Trend {
    const ALL: &'static [Self] = &[Trend::WithFilter, Trend::AgainstFilter];

    fn as_str(&self) -> &'static str {
        match self {
            Trend::WithFilter => "with_m200",
            Trend::AgainstFilter => "against_m200",
        }
    }
}

/// Distance of the entry from the reference moving-average filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "near_m200", alias = "near_filter")]
    NearFilter,
    #[serde(rename = "far_from_m200", alias = "far_from_filter")]
    FarFromFilter,
}

impl Category for Location {
    const ALL: &'static [Self] = &[Location::NearFilter, Location::FarFromFilter];

    fn as_str(&self) -> &'static str {
        match self {
            Location::NearFilter => "near_m200",
            Location::FarFromFilter => "far_from_m200",
        }
    }
}

/// Chart period the trade was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFrame {
    M2,
    M5,
    M15,
    H1,
}

impl Category for TimeFrame {
    const ALL: &'static [Self] = &[TimeFrame::M2, TimeFrame::M5, TimeFrame::M15, TimeFrame::H1];

    fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::M2 => "M2",
            TimeFrame::M5 => "M5",
            TimeFrame::M15 => "M15",
            TimeFrame::H1 => "H1",
        }
    }
}

/// Trailing-stop style used to manage the position.
///
/// Records written before this field existed default to `TrailFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrailingStop {
    /// Stop trailed along the filter ("T/F")
    #[default]
    #[serde(rename = "T/F")]
    TrailFilter,
    /// Stop trailed bar by bar ("B/B")
    #[serde(rename = "B/B")]
    BarByBar,
}

impl Category for TrailingStop {
    const ALL: &'static [Self] = &[TrailingStop::TrailFilter, TrailingStop::BarByBar];

    fn as_str(&self) -> &'static str {
        match self {
            TrailingStop::TrailFilter => "T/F",
            TrailingStop::BarByBar => "B/B",
        }
    }
}

/// Win/loss tag of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Gain,
    Loss,
}

impl Category for TradeResult {
    const ALL: &'static [Self] = &[TradeResult::Gain, TradeResult::Loss];

    fn as_str(&self) -> &'static str {
        match self {
            TradeResult::Gain => "gain",
            TradeResult::Loss => "loss",
        }
    }
}

/// Realized risk multiple of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Full stop-out (-1R)
    #[serde(rename = "-1")]
    Loss,
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "2:1")]
    TwoToOne,
    #[serde(rename = "3:1")]
    ThreeToOne,
    #[serde(rename = "4:1")]
    FourToOne,
}

impl Category for Outcome {
    const ALL: &'static [Self] = &[
        Outcome::Loss,
        Outcome::OneToOne,
        Outcome::TwoToOne,
        Outcome::ThreeToOne,
        Outcome::FourToOne,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Loss => "-1",
            Outcome::OneToOne => "1:1",
            Outcome::TwoToOne => "2:1",
            Outcome::ThreeToOne => "3:1",
            Outcome::FourToOne => "4:1",
        }
    }
}

impl Outcome {
    /// R-value of this outcome: -1 for a loss, the reward multiple otherwise.
    pub fn r_value(&self) -> i32 {
        match self {
            Outcome::Loss => -1,
            Outcome::OneToOne => 1,
            Outcome::TwoToOne => 2,
            Outcome::ThreeToOne => 3,
            Outcome::FourToOne => 4,
        }
    }

    /// The result consistent with this outcome.
    pub fn implied_result(&self) -> TradeResult {
        match self {
            Outcome::Loss => TradeResult::Loss,
            _ => TradeResult::Gain,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    OperationType,
    Setup,
    Trend,
    Location,
    TimeFrame,
    TrailingStop,
    TradeResult,
    Outcome,
);

/// A single journal entry.
///
/// Field names on the wire are camelCase and `timestamp` is stored under
/// `date`, so the JSON layout matches previously saved journals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    /// Opaque unique identifier, immutable after creation
    pub id: String,

    /// When the record was created
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,

    /// Free-text symbol, kept exactly as entered
    pub asset: String,

    pub operation_type: OperationType,

    pub setup: Setup,

    pub trend: Trend,

    pub location: Location,

    pub time_frame: TimeFrame,

    #[serde(alias = "trailingStopUsed")]
    pub trailing_stop: TrailingStop,

    pub result: TradeResult,

    pub outcome: Outcome,

    /// Embedded image payload (base64), opaque to all logic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    #[serde(default)]
    pub comment: String,
}

impl TradeRecord {
    /// Build a record from user-entered fields.
    pub fn from_new(id: impl Into<String>, timestamp: DateTime<Utc>, trade: NewTrade) -> Self {
        Self {
            id: id.into(),
            timestamp,
            asset: trade.asset,
            operation_type: trade.operation_type,
            setup: trade.setup,
            trend: trade.trend,
            location: trade.location,
            time_frame: trade.time_frame,
            trailing_stop: trade.trailing_stop,
            result: trade.result,
            outcome: trade.outcome,
            screenshot: trade.screenshot,
            comment: trade.comment,
        }
    }

    /// Asset key used for grouping: trimmed and upper-cased.
    /// The stored `asset` field is never rewritten.
    pub fn normalized_asset(&self) -> String {
        normalize_asset(&self.asset)
    }

    /// R-value of this trade, taken from `outcome`.
    pub fn r_value(&self) -> i32 {
        self.outcome.r_value()
    }

    /// Whether the trade counts as a win. `outcome` is authoritative,
    /// so an inconsistent `result` tag is ignored here.
    pub fn is_win(&self) -> bool {
        self.outcome.implied_result() == TradeResult::Gain
    }

    /// Shallow-merge an update into this record. The id never changes.
    pub fn apply(&mut self, update: TradeUpdate) {
        let TradeUpdate {
            timestamp,
            asset,
            operation_type,
            setup,
            trend,
            location,
            time_frame,
            trailing_stop,
            result,
            outcome,
            screenshot,
            comment,
        } = update;

        if let Some(v) = timestamp {
            self.timestamp = v;
        }
        if let Some(v) = asset {
            self.asset = v;
        }
        if let Some(v) = operation_type {
            self.operation_type = v;
        }
        if let Some(v) = setup {
            self.setup = v;
        }
        if let Some(v) = trend {
            self.trend = v;
        }
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = time_frame {
            self.time_frame = v;
        }
        if let Some(v) = trailing_stop {
            self.trailing_stop = v;
        }
        if let Some(v) = result {
            self.result = v;
        }
        if let Some(v) = outcome {
            self.outcome = v;
        }
        if let Some(v) = screenshot {
            self.screenshot = v;
        }
        if let Some(v) = comment {
            self.comment = v;
        }
    }
}

/// Grouping key for a free-text asset symbol.
pub fn normalize_asset(asset: &str) -> String {
    asset.trim().to_uppercase()
}

/// Fields for a new journal entry. Id and timestamp are assigned on add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub asset: String,
    pub operation_type: OperationType,
    pub setup: Setup,
    pub trend: Trend,
    pub location: Location,
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub trailing_stop: TrailingStop,
    pub result: TradeResult,
    pub outcome: Outcome,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub comment: String,
}

impl NewTrade {
    /// Create a new entry with `result` derived from `outcome`,
    /// default trailing stop, no screenshot and an empty comment.
    pub fn new(
        asset: impl Into<String>,
        operation_type: OperationType,
        setup: Setup,
        trend: Trend,
        location: Location,
        time_frame: TimeFrame,
        outcome: Outcome,
    ) -> Self {
        Self {
            asset: asset.into(),
            operation_type,
            setup,
            trend,
            location,
            time_frame,
            trailing_stop: TrailingStop::default(),
            result: outcome.implied_result(),
            outcome,
            screenshot: None,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_trailing_stop(mut self, trailing_stop: TrailingStop) -> Self {
        self.trailing_stop = trailing_stop;
        self
    }

    pub fn with_screenshot(mut self, screenshot: impl Into<String>) -> Self {
        self.screenshot = Some(screenshot.into());
        self
    }
}

/// Partial update of a journal entry. `None` leaves a field untouched.
///
/// `screenshot` is doubly optional: `Some(None)` removes the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeUpdate {
    pub timestamp: Option<DateTime<Utc>>,
    pub asset: Option<String>,
    pub operation_type: Option<OperationType>,
    pub setup: Option<Setup>,
    pub trend: Option<Trend>,
    pub location: Option<Location>,
    pub time_frame: Option<TimeFrame>,
    pub trailing_stop: Option<TrailingStop>,
    pub result: Option<TradeResult>,
    pub outcome: Option<Outcome>,
    pub screenshot: Option<Option<String>>,
    pub comment: Option<String>,
}

impl TradeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outcome and keep `result` consistent with it.
    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self.result = Some(outcome.implied_result());
        self
    }

    pub fn asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn setup(mut self, setup: Setup) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn operation_type(mut self, operation_type: OperationType) -> Self {
        self.operation_type = Some(operation_type);
        self
    }

    pub fn trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn time_frame(mut self, time_frame: TimeFrame) -> Self {
        self.time_frame = Some(time_frame);
        self
    }

    pub fn trailing_stop(mut self, trailing_stop: TrailingStop) -> Self {
        self.trailing_stop = Some(trailing_stop);
        self
    }

    /// Override the win/loss tag directly. Prefer [`outcome`](Self::outcome),
    /// which keeps the two consistent.
    pub fn result(mut self, result: TradeResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn screenshot(mut self, screenshot: impl Into<String>) -> Self {
        self.screenshot = Some(Some(screenshot.into()));
        self
    }

    pub fn clear_screenshot(mut self) -> Self {
        self.screenshot = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Column a trade listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeSortKey {
    #[default]
    Date,
    Asset,
    OperationType,
    Setup,
    TrailingStop,
    TimeFrame,
    Result,
    Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    /// Newest/largest first (default for display)
    #[default]
    Desc,
}

/// Search text plus sort order for a trade listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeQuery {
    /// Case-insensitive substring matched against asset, setup and comment
    pub search: String,
    pub sort_key: TradeSortKey,
    pub direction: SortDirection,
}
