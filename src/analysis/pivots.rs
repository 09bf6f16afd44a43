use std::cmp::Ordering;

use itertools::Itertools;

use crate::data::{Bar, PivotLow};

/// Locate the most recent confirmed pivot low in `bars`.
///
/// A pivot at position `i` needs a low strictly below every low within `k`
/// bars on each side; strict comparison keeps flat plateaus from counting.
/// With `exclude_latest` the final bar can never be the pivot, since no later
/// bar has confirmed it yet. The scan covers roughly the last `max_lookback`
/// bars and returns the first (most recent) hit.
///
/// When nothing confirms inside the window the minimum low of the window is
/// returned, flagged unconfirmed. An empty window falls back to the bar
/// before the last one, or bar zero for a one-bar series. Only an empty
/// series yields `None`.
pub fn find_pivot_low(
    bars: &[Bar],
    k: usize,
    max_lookback: usize,
    exclude_latest: bool,
) -> Option<PivotLow> {
    let n = bars.len();
    if n == 0 {
        return None;
    }

    let lows: Vec<f64> = bars.iter().map(|bar| bar.low).collect();
    let end = if exclude_latest { n - 1 } else { n };
    let start = end.saturating_sub(max_lookback + k + 1);

    if let Some(newest) = end.checked_sub(k + 1) {
        for i in (start + k..=newest).rev() {
            let low = lows[i];
            if !low.is_finite() {
                continue;
            }
            let left = &lows[i - k..i];
            let right = &lows[i + 1..i + 1 + k];
            if left.iter().all(|&v| low < v) && right.iter().all(|&v| low < v) {
                return Some(pivot_at(bars, i, true));
            }
        }
    }

    // No confirmed pivot: fall back to the window minimum, then to the
    // nearest prior bar for degenerate series.
    let index = if start >= end {
        if n >= 2 {
            n - 2
        } else {
            0
        }
    } else {
        let offset = lows[start..end]
            .iter()
            .position_min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .unwrap_or(0);
        start + offset
    };
    Some(pivot_at(bars, index, false))
}

fn pivot_at(bars: &[Bar], index: usize, confirmed: bool) -> PivotLow {
    PivotLow {
        price: bars[index].low,
        date: bars[index].date,
        index,
        confirmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn bars_from_lows(lows: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        lows.iter()
            .enumerate()
            .map(|(i, &low)| Bar {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: low + 1.0,
                high: low + 2.0,
                low,
                close: low + 1.0,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn single_clear_valley_is_confirmed() {
        let lows = [10.0, 9.5, 9.0, 8.5, 7.0, 8.2, 8.8, 9.3, 9.9, 10.4];
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert_eq!(pivot.index, 4);
        assert!((pivot.price - 7.0).abs() < 1e-12);
        assert!(pivot.confirmed);
    }

    #[test]
    fn most_recent_pivot_wins() {
        // Two valleys; the later one at index 10 must be picked first.
        let lows = [
            9.0, 8.0, 5.0, 8.5, 9.5, 9.8, 9.0, 8.0, 7.5, 7.2, 6.0, 7.0, 7.8, 8.4, 9.1,
        ];
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert_eq!(pivot.index, 10);
        assert!(pivot.confirmed);
    }

    #[test]
    fn plateau_is_not_a_pivot() {
        // Flat bottom: no strict minimum, so the scan falls back.
        let lows = [9.0, 8.0, 7.0, 7.0, 7.0, 8.0, 9.0, 9.5, 10.0, 10.5, 11.0];
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert!(!pivot.confirmed);
        assert!((pivot.price - 7.0).abs() < 1e-12);
    }

    #[test]
    fn latest_bar_excluded_even_when_lowest() {
        let lows = [9.0, 9.5, 9.8, 8.0, 8.6, 9.2, 9.6, 9.8, 5.0];
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert_ne!(pivot.index, bars.len() - 1);
        assert_eq!(pivot.index, 3);
        assert!(pivot.confirmed);
    }

    #[test]
    fn monotonic_lows_fall_back_to_window_minimum() {
        let lows: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert!(!pivot.confirmed);
        // Minimum of the search window, which stops short of the last bar.
        assert_eq!(pivot.index, bars.len() - 2);
    }

    #[test]
    fn lookback_horizon_limits_the_scan() {
        // Deep valley far in the past, shallow one recent; a short horizon
        // must not reach the old valley.
        let mut lows = vec![9.0; 200];
        lows[10] = 1.0;
        lows[190] = 6.0;
        let bars = bars_from_lows(&lows);
        let pivot = find_pivot_low(&bars, 3, 30, true).unwrap();
        assert_eq!(pivot.index, 190);
        assert!(pivot.confirmed);
    }

    #[test]
    fn two_bar_series_falls_back_to_first_bar() {
        let bars = bars_from_lows(&[5.0, 4.0]);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert_eq!(pivot.index, 0);
        assert!(!pivot.confirmed);
    }

    #[test]
    fn one_bar_series_falls_back_to_itself() {
        let bars = bars_from_lows(&[5.0]);
        let pivot = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert_eq!(pivot.index, 0);
        assert!(!pivot.confirmed);
    }

    #[test]
    fn empty_series_yields_none() {
        assert!(find_pivot_low(&[], 3, 120, true).is_none());
    }

    #[test]
    fn include_latest_allows_right_edge_candidates() {
        // With the last bar eligible as confirmation material, the valley
        // right before the edge can confirm.
        let lows = [9.0, 8.5, 8.0, 6.0, 7.0, 7.5, 8.2];
        let bars = bars_from_lows(&lows);
        let excluded = find_pivot_low(&bars, 3, 120, true).unwrap();
        assert!(!excluded.confirmed);
        let included = find_pivot_low(&bars, 3, 120, false).unwrap();
        assert_eq!(included.index, 3);
        assert!(included.confirmed);
    }
}
