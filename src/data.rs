use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// Single daily OHLCV bar.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Which bar of the series acts as the evaluation point.
///
/// `Yesterday` drops the newest bar before anything is computed, which keeps
/// intraday partial bars from leaking into the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum BaseDay {
    Today,
    Yesterday,
}

impl BaseDay {
    /// Index of the reference bar for a series of `n` bars.
    pub fn base_index(self, n: usize) -> usize {
        match self {
            BaseDay::Yesterday if n >= 2 => n - 2,
            _ => n.saturating_sub(1),
        }
    }
}

impl std::fmt::Display for BaseDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BaseDay::Today => "today",
            BaseDay::Yesterday => "yesterday",
        })
    }
}

/// ATR averaging mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum AtrMethod {
    /// Simple moving average of the true range.
    Sma,
    /// Wilder smoothing seeded by the simple average of the first window.
    Wilder,
}

impl std::fmt::Display for AtrMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AtrMethod::Sma => "sma",
            AtrMethod::Wilder => "wilder",
        })
    }
}

/// Structural support candidate returned by the pivot scan.
#[derive(Debug, Clone, Serialize)]
pub struct PivotLow {
    pub price: f64,
    pub date: NaiveDate,
    pub index: usize,
    /// True when the pivot satisfied the symmetric confirmation test;
    /// false when the value came from one of the fallback rules.
    pub confirmed: bool,
}

/// Moving averages of the close, evaluated at the reference bar.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MovingAverages {
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
}

/// All structural metrics for one (series, reference index) pair.
///
/// `None` always means "not enough bars for this window", never an error;
/// callers must tolerate partial bundles.
#[derive(Debug, Clone, Serialize)]
pub struct MetricBundle {
    pub base_date: NaiveDate,
    pub close: f64,
    pub resistance: f64,
    pub support: PivotLow,
    pub ma: MovingAverages,
    /// MA20 one bar earlier, used for the slope check.
    pub prev_ma20: Option<f64>,
    pub atr: Option<f64>,
    /// ATR as a fraction of the reference close.
    pub atr_pct: Option<f64>,
    /// Median ATR% over the trailing 60 bars, for context.
    pub atr_pct_median: Option<f64>,
    /// Average volume over the volume window, in reporting units.
    pub volume_avg: Option<f64>,
    /// Reference-bar volume, in reporting units.
    pub volume: f64,
}

/// One buy level with its stop and 1R/2R/3R targets.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntryLadder {
    pub buy: f64,
    pub stop: f64,
    pub risk: f64,
    pub targets: [f64; 3],
}

impl EntryLadder {
    pub fn new(buy: f64, stop: f64) -> Self {
        let risk = buy - stop;
        Self {
            buy,
            stop,
            risk,
            targets: [buy + risk, buy + 2.0 * risk, buy + 3.0 * risk],
        }
    }
}

/// Entry plan for the breakout setup (two adds above the prior high).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreakoutPlan {
    pub first: EntryLadder,
    pub second: EntryLadder,
}

/// Entry plan for the dip setup (two adds above the structural low).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DipPlan {
    pub first: EntryLadder,
    pub second: EntryLadder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Breakout,
    Dip,
    Pullback,
    None,
}

impl Signal {
    pub fn label(self) -> &'static str {
        match self {
            Signal::Breakout => "breakout",
            Signal::Dip => "dip",
            Signal::Pullback => "ma20-pullback",
            Signal::None => "-",
        }
    }
}

/// Scored setups derived from one metric bundle.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    /// Evaluation price the conditions were checked against.
    pub eval_price: f64,
    /// MA alignment score, 0..=6.
    pub ma_score: u32,
    pub ma20_rising: bool,
    pub dist_resistance: Option<f64>,
    pub dist_support: Option<f64>,
    pub dist_ma20: Option<f64>,
    pub volume_ratio: Option<f64>,
    /// Volume ratio corrected for session progress.
    pub volume_ratio_adj: Option<f64>,
    pub breakout: Option<BreakoutPlan>,
    pub dip: Option<DipPlan>,
    pub pullback: Option<EntryLadder>,
    /// Trailing protective stops at 2.5 and 3.0 ATR below the high-water mark.
    pub chandelier: Option<(f64, f64)>,
    pub atr_in_band: Option<bool>,
    pub breakout_score: u32,
    pub dip_score: u32,
    pub pullback_score: u32,
    pub score: u32,
    pub signal: Signal,
}

/// Final per-instrument result merged by the batch runner.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub symbol: String,
    pub bars: usize,
    pub metrics: MetricBundle,
    pub signals: SignalReport,
}
