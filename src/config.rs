use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::data::{AtrMethod, BaseDay};

/// Command-line configuration for the structure recon tool.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Input CSV files containing daily OHLCV data, one instrument per file.
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Confirmation width: bars required on each side of a pivot low.
    #[arg(long, default_value_t = 3)]
    pub pivot_k: usize,

    /// How many bars back to search for a structural pivot.
    #[arg(long, default_value_t = 120)]
    pub struct_lookback: usize,

    /// Allow the reference bar itself to be reported as the pivot low.
    /// By default only pivots confirmed by later bars are eligible.
    #[arg(long, action = ArgAction::SetTrue)]
    pub include_latest: bool,

    /// Trailing window for the resistance (prior high) level.
    #[arg(long, default_value_t = 20)]
    pub res_lookback: usize,

    /// ATR period.
    #[arg(long, default_value_t = 10)]
    pub atr_period: usize,

    /// ATR averaging mode.
    #[arg(long, value_enum, default_value_t = AtrMethod::Sma)]
    pub atr_method: AtrMethod,

    /// Trailing window for the average volume.
    #[arg(long, default_value_t = 10)]
    pub volume_window: usize,

    /// Divisor applied to volume figures for reporting.
    #[arg(long, default_value_t = 1e4)]
    pub volume_unit: f64,

    /// Which bar acts as the evaluation point.
    #[arg(long, value_enum, default_value_t = BaseDay::Today)]
    pub base_day: BaseDay,

    /// Minimum score for a setup to be reported as a signal.
    #[arg(long, default_value_t = 70)]
    pub signal_threshold: u32,

    /// Minutes elapsed in the trading session; omit for a completed session.
    /// Used to correct the volume ratio intraday.
    #[arg(long, value_name = "MINUTES")]
    pub elapsed_minutes: Option<u32>,

    /// Worker threads for the batch run.
    #[arg(long, default_value_t = 12)]
    pub workers: usize,
}

impl AppConfig {
    pub fn exclude_latest(&self) -> bool {
        !self.include_latest
    }
}
