use statrs::statistics::{Data, Median};

use crate::analysis::atr::atr_series;
use crate::analysis::levels::{resistance, trailing_mean};
use crate::analysis::pivots::find_pivot_low;
use crate::config::AppConfig;
use crate::data::{Bar, MetricBundle, MovingAverages};

/// Window for the contextual median of the ATR% distribution.
const ATR_PCT_MEDIAN_WINDOW: usize = 60;

/// Compute the metric bundle at the reference bar selected by `base_day`.
pub fn compute_metrics(bars: &[Bar], config: &AppConfig) -> Option<MetricBundle> {
    if bars.is_empty() {
        return None;
    }
    compute_at(bars, config.base_day.base_index(bars.len()), config)
}

/// Compute the metric bundle as of the bar at `reference`.
///
/// Only bars up to and including `reference` take part; bars after it
/// cannot influence any output. Individual metrics degrade to `None` when
/// their window exceeds the truncated series.
pub fn compute_at(bars: &[Bar], reference: usize, config: &AppConfig) -> Option<MetricBundle> {
    if reference >= bars.len() {
        return None;
    }
    let bars = &bars[..=reference];
    let base = bars.last()?;

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|bar| bar.volume).collect();

    let ma = MovingAverages {
        ma5: trailing_mean(&closes, 5),
        ma10: trailing_mean(&closes, 10),
        ma20: trailing_mean(&closes, 20),
        ma60: trailing_mean(&closes, 60),
    };
    let prev_ma20 = trailing_mean(&closes[..closes.len() - 1], 20);

    let resistance = resistance(bars, config.res_lookback)?;
    let support = find_pivot_low(
        bars,
        config.pivot_k,
        config.struct_lookback,
        config.exclude_latest(),
    )?;

    let atr_values = atr_series(bars, config.atr_period, config.atr_method);
    let atr = atr_values.last().copied().flatten();
    let atr_pct = atr.and_then(|atr| {
        if base.close != 0.0 {
            Some(atr / base.close)
        } else {
            None
        }
    });
    let atr_pct_median = trailing_atr_pct_median(&atr_values, &closes);

    let unit = if config.volume_unit > 0.0 {
        config.volume_unit
    } else {
        1.0
    };
    let volume_avg = trailing_mean(&volumes, config.volume_window).map(|v| v / unit);

    Some(MetricBundle {
        base_date: base.date,
        close: base.close,
        resistance,
        support,
        ma,
        prev_ma20,
        atr,
        atr_pct,
        atr_pct_median,
        volume_avg,
        volume: base.volume / unit,
    })
}

fn trailing_atr_pct_median(atr_values: &[Option<f64>], closes: &[f64]) -> Option<f64> {
    let from = atr_values.len().saturating_sub(ATR_PCT_MEDIAN_WINDOW);
    let samples: Vec<f64> = atr_values[from..]
        .iter()
        .zip(&closes[from..])
        .filter_map(|(atr, close)| match atr {
            Some(atr) if *close != 0.0 => Some(atr / close),
            _ => None,
        })
        .filter(|pct| pct.is_finite())
        .collect();
    if samples.is_empty() {
        return None;
    }
    Some(Data::new(samples).median())
}
