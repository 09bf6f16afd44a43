use crate::data::{AtrMethod, Bar};

/// Per-bar true range. The first bar has no prior close and falls back to
/// its own high/low span.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    for (idx, bar) in bars.iter().enumerate() {
        let tr = if idx == 0 {
            bar.high - bar.low
        } else {
            let prev_close = bars[idx - 1].close;
            let high_low = bar.high - bar.low;
            let high_close = (bar.high - prev_close).abs();
            let low_close = (bar.low - prev_close).abs();
            high_low.max(high_close).max(low_close)
        };
        out.push(tr.max(0.0));
    }
    out
}

/// Average True Range series aligned with `bars`.
///
/// Entries before `period - 1` are `None` (not enough true ranges).
/// Wilder mode seeds with the simple average of the first `period` true
/// ranges and then smooths recursively with `atr += (tr - atr) / period`.
pub fn atr_series(bars: &[Bar], period: usize, method: AtrMethod) -> Vec<Option<f64>> {
    let n = bars.len();
    if period == 0 || n < period {
        return vec![None; n];
    }

    let true_ranges = true_ranges(bars);
    let mut out = vec![None; n];
    let seed = true_ranges[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    match method {
        AtrMethod::Sma => {
            for idx in period..n {
                let window = &true_ranges[idx + 1 - period..=idx];
                out[idx] = Some(window.iter().sum::<f64>() / period as f64);
            }
        }
        AtrMethod::Wilder => {
            let mut prev = seed;
            for idx in period..n {
                prev += (true_ranges[idx] - prev) / period as f64;
                out[idx] = Some(prev);
            }
        }
    }

    out
}
