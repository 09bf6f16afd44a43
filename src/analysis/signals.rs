use crate::data::{
    BreakoutPlan, DipPlan, EntryLadder, MetricBundle, MovingAverages, Signal, SignalReport,
};

/// Trading session length in minutes.
pub const SESSION_MINUTES: f64 = 240.0;
/// Floor for the intraday progress fraction; without it a fresh session
/// makes the adjusted volume ratio explode.
pub const PROGRESS_FLOOR: f64 = 0.03;

/// Tunables for the scoring rules. All ATR figures are multiples of the
/// bundle's ATR value.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Breakout buy sits this fraction above the resistance level.
    pub breakout_eps: f64,
    pub breakout_add_atr: f64,
    pub breakout_stop_atr: f64,
    pub dip_first_atr: f64,
    pub dip_second_atr: f64,
    pub dip_stop_atr: f64,
    pub pullback_buy_atr: f64,
    pub pullback_stop_atr: f64,
    pub chandelier_atr: (f64, f64),
    pub vol_mult_breakout: f64,
    pub vol_mult_dip: f64,
    pub vol_mult_pullback: f64,
    /// Healthy ATR% band: below it the name is too quiet, above it too wild.
    pub atr_pct_floor: f64,
    pub atr_pct_ceiling: f64,
    /// Minimum score for a setup to fire.
    pub threshold: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            breakout_eps: 0.001,
            breakout_add_atr: 0.3,
            breakout_stop_atr: 0.8,
            dip_first_atr: 0.3,
            dip_second_atr: 0.8,
            dip_stop_atr: 0.6,
            pullback_buy_atr: 0.2,
            pullback_stop_atr: 1.0,
            chandelier_atr: (2.5, 3.0),
            vol_mult_breakout: 1.5,
            vol_mult_dip: 0.8,
            vol_mult_pullback: 1.0,
            atr_pct_floor: 0.015,
            atr_pct_ceiling: 0.06,
            threshold: 70,
        }
    }
}

/// Live inputs that cannot be derived from the bar series.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    /// Current quote; falls back to the reference close.
    pub price: Option<f64>,
    /// High-water mark since entry, for the chandelier stops.
    pub entry_high: Option<f64>,
    /// Session progress in [0, 1]; 1.0 for a completed session.
    pub progress: f64,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            price: None,
            entry_high: None,
            progress: 1.0,
        }
    }
}

/// Map elapsed session minutes to a clamped progress fraction.
/// `None` means the session is over.
pub fn session_progress(elapsed_minutes: Option<u32>) -> f64 {
    match elapsed_minutes {
        None => 1.0,
        Some(minutes) => {
            let ft = (minutes as f64 / SESSION_MINUTES).clamp(0.0, 1.0);
            if ft > 0.0 && ft < 1.0 {
                ft.max(PROGRESS_FLOOR)
            } else {
                ft
            }
        }
    }
}

/// Score the breakout, dip and MA20-pullback setups against one bundle.
///
/// Each setup scores `ma_score * 10`, plus 20 when its trigger condition
/// holds, plus 10 more when the volume gate also holds. The best setup at
/// or above the threshold becomes the signal.
pub fn evaluate(metrics: &MetricBundle, ctx: EvalContext, config: &SignalConfig) -> SignalReport {
    let eval_price = ctx.price.unwrap_or(metrics.close);
    let ma = metrics.ma;

    let ma_score = alignment_score(eval_price, ma);
    let ma20_rising = match (ma.ma20, metrics.prev_ma20) {
        (Some(now), Some(prev)) => now >= prev,
        _ => false,
    };

    let dist_resistance = relative_distance(eval_price, Some(metrics.resistance));
    let dist_support = relative_distance(eval_price, Some(metrics.support.price));
    let dist_ma20 = relative_distance(eval_price, ma.ma20);

    let atr = metrics.atr;
    let breakout = atr.map(|atr| {
        let buy = metrics.resistance * (1.0 + config.breakout_eps);
        let stop = metrics.resistance - config.breakout_stop_atr * atr;
        BreakoutPlan {
            first: EntryLadder::new(buy, stop),
            second: EntryLadder::new(buy + config.breakout_add_atr * atr, stop),
        }
    });
    let dip = atr.map(|atr| {
        let stop = metrics.support.price - config.dip_stop_atr * atr;
        DipPlan {
            first: EntryLadder::new(metrics.support.price + config.dip_first_atr * atr, stop),
            second: EntryLadder::new(metrics.support.price + config.dip_second_atr * atr, stop),
        }
    });
    let pullback = match (ma.ma20, atr) {
        (Some(ma20), Some(atr)) => Some(EntryLadder::new(
            ma20 - config.pullback_buy_atr * atr,
            ma20 - config.pullback_stop_atr * atr,
        )),
        _ => None,
    };

    let chandelier = atr.map(|atr| {
        let base = ctx
            .entry_high
            .map_or(metrics.close, |high| high.max(metrics.close));
        (
            base - config.chandelier_atr.0 * atr,
            base - config.chandelier_atr.1 * atr,
        )
    });

    let ft = ctx.progress;
    let volume_ratio = metrics
        .volume_avg
        .filter(|avg| *avg > 0.0)
        .map(|avg| metrics.volume / avg);
    let volume_ratio_adj = volume_ratio.and_then(|_| {
        let avg = metrics.volume_avg?;
        if ft > 0.0 {
            Some(metrics.volume / (avg * ft))
        } else {
            None
        }
    });
    let volume_gate = |mult: f64| -> bool {
        match metrics.volume_avg {
            Some(avg) if avg > 0.0 && ft > 0.0 => metrics.volume >= mult * avg * ft,
            _ => false,
        }
    };

    let breakout_hit = breakout
        .as_ref()
        .map(|plan| eval_price >= metrics.resistance || eval_price >= plan.first.buy)
        .unwrap_or(false);
    let in_dip_band = dip
        .as_ref()
        .map(|plan| {
            let lo = plan.first.buy.min(plan.second.buy);
            let hi = plan.first.buy.max(plan.second.buy);
            lo <= eval_price && eval_price <= hi
        })
        .unwrap_or(false);
    let in_pullback_band = match (pullback.as_ref(), ma.ma20) {
        (Some(ladder), Some(ma20)) => ladder.buy <= eval_price && eval_price <= ma20,
        _ => false,
    };

    let base = ma_score * 10;
    let setup_score = |hit: bool, vol_ok: bool| -> u32 {
        base + if hit { 20 } else { 0 } + if hit && vol_ok { 10 } else { 0 }
    };
    let breakout_score = setup_score(breakout_hit, volume_gate(config.vol_mult_breakout));
    let dip_score = setup_score(in_dip_band, volume_gate(config.vol_mult_dip));
    let pullback_score = setup_score(in_pullback_band, volume_gate(config.vol_mult_pullback));

    let score = breakout_score.max(dip_score).max(pullback_score);
    let signal = if score < config.threshold {
        Signal::None
    } else if breakout_score >= config.threshold && breakout_score >= dip_score.max(pullback_score)
    {
        Signal::Breakout
    } else if dip_score >= config.threshold && dip_score >= pullback_score {
        Signal::Dip
    } else {
        Signal::Pullback
    };

    let atr_in_band = metrics
        .atr_pct
        .map(|pct| pct >= config.atr_pct_floor && pct <= config.atr_pct_ceiling);

    SignalReport {
        eval_price,
        ma_score,
        ma20_rising,
        dist_resistance,
        dist_support,
        dist_ma20,
        volume_ratio,
        volume_ratio_adj,
        breakout,
        dip,
        pullback,
        chandelier,
        atr_in_band,
        breakout_score,
        dip_score,
        pullback_score,
        score,
        signal,
    }
}

/// Count how many of the six trend-alignment checks hold; missing
/// operands contribute nothing.
fn alignment_score(eval_price: f64, ma: MovingAverages) -> u32 {
    let checks = [
        (Some(eval_price), ma.ma5),
        (Some(eval_price), ma.ma10),
        (Some(eval_price), ma.ma20),
        (ma.ma5, ma.ma10),
        (ma.ma10, ma.ma20),
        (ma.ma20, ma.ma60),
    ];
    checks
        .iter()
        .filter(|(a, b)| matches!((a, b), (Some(a), Some(b)) if a > b))
        .count() as u32
}

fn relative_distance(eval_price: f64, level: Option<f64>) -> Option<f64> {
    match level {
        Some(level) if level != 0.0 => Some((eval_price - level) / level),
        _ => None,
    }
}
