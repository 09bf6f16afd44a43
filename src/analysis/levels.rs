use crate::data::Bar;

/// Resistance level: maximum high over the trailing `lookback` bars.
/// A series shorter than the window uses every available bar.
pub fn resistance(bars: &[Bar], lookback: usize) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }
    let take = lookback.max(1).min(bars.len());
    let max = bars[bars.len() - take..]
        .iter()
        .map(|bar| bar.high)
        .fold(f64::NEG_INFINITY, f64::max);
    Some(max)
}

/// Arithmetic mean over the trailing `window` values, or `None` when the
/// series is shorter than the window.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let sum: f64 = values[values.len() - window..].iter().sum();
    Some(sum / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn bars_from_highs(highs: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        highs
            .iter()
            .enumerate()
            .map(|(i, &high)| Bar {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: high - 1.0,
                high,
                low: high - 2.0,
                close: high - 1.0,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn resistance_over_exact_window() {
        let bars = bars_from_highs(&[10.0, 14.0, 12.0, 11.0]);
        assert_eq!(resistance(&bars, 4), Some(14.0));
    }

    #[test]
    fn resistance_ignores_bars_outside_window() {
        let bars = bars_from_highs(&[20.0, 10.0, 12.0, 11.0]);
        assert_eq!(resistance(&bars, 3), Some(12.0));
    }

    #[test]
    fn short_series_uses_all_bars() {
        let bars = bars_from_highs(&[10.0, 14.0]);
        assert_eq!(resistance(&bars, 20), Some(14.0));
    }

    #[test]
    fn trailing_mean_window_semantics() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing_mean(&values, 2), Some(3.5));
        assert_eq!(trailing_mean(&values, 4), Some(2.5));
        assert_eq!(trailing_mean(&values, 5), None);
        assert_eq!(trailing_mean(&values, 0), None);
    }
}
