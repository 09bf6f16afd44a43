pub mod atr;
pub mod levels;
pub mod metrics;
pub mod pivots;
pub mod signals;

pub use atr::atr_series;
pub use levels::{resistance, trailing_mean};
pub use metrics::{compute_at, compute_metrics};
pub use pivots::find_pivot_low;
pub use signals::{evaluate, session_progress, EvalContext, SignalConfig};
