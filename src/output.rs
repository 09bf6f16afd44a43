use tabled::{settings::Style, Table, Tabled};

use crate::data::{EntryLadder, InstrumentReport, Signal};
use crate::runner::BatchOutcome;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Resistance")]
    resistance: String,
    #[tabled(rename = "Support")]
    support: String,
    #[tabled(rename = "Pivot")]
    pivot: String,
    #[tabled(rename = "MA5")]
    ma5: String,
    #[tabled(rename = "MA10")]
    ma10: String,
    #[tabled(rename = "MA20")]
    ma20: String,
    #[tabled(rename = "MA60")]
    ma60: String,
    #[tabled(rename = "ATR")]
    atr: String,
    #[tabled(rename = "ATR%")]
    atr_pct: String,
    #[tabled(rename = "VolAvg")]
    volume_avg: String,
    #[tabled(rename = "VolRatio")]
    volume_ratio: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Signal")]
    signal: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Setup")]
    setup: &'static str,
    #[tabled(rename = "Buy")]
    buy: String,
    #[tabled(rename = "Stop")]
    stop: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "T1")]
    t1: String,
    #[tabled(rename = "T2")]
    t2: String,
    #[tabled(rename = "T3")]
    t3: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

pub fn print_report(outcome: &BatchOutcome) {
    println!("\n=== Structural Level Recon ===\n");

    for report in &outcome.reports {
        print_context(report);
    }

    if !outcome.reports.is_empty() {
        let rows: Vec<MetricRow> = outcome.reports.iter().map(metric_row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("\n{table}\n");

        let plans: Vec<PlanRow> = outcome.reports.iter().flat_map(plan_rows).collect();
        if !plans.is_empty() {
            let mut table = Table::new(plans);
            table.with(Style::rounded());
            println!("{table}\n");
        }
    }

    for (symbol, err) in &outcome.failures {
        eprintln!("{symbol}: {err:#}");
    }
}

fn print_context(report: &InstrumentReport) {
    let metrics = &report.metrics;
    let signals = &report.signals;
    let band = match signals.atr_in_band {
        Some(true) => "in band",
        Some(false) => "out of band",
        None => "n/a",
    };
    let chandelier = signals
        .chandelier
        .map(|(tight, wide)| format!("{tight:.2}/{wide:.2}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}: {} bars through {} | eval {:.2} | trend {}/6{} | dist res {} sup {} ma20 {}",
        report.symbol,
        report.bars,
        metrics.base_date.format("%Y-%m-%d"),
        signals.eval_price,
        signals.ma_score,
        if signals.ma20_rising {
            ", ma20 rising"
        } else {
            ""
        },
        fmt_pct(signals.dist_resistance),
        fmt_pct(signals.dist_support),
        fmt_pct(signals.dist_ma20),
    );
    println!(
        "    atr {} ({}, median {}) | vol ratio {} | chandelier {}",
        fmt_opt(metrics.atr, 3),
        band,
        fmt_pct(metrics.atr_pct_median),
        fmt_opt(signals.volume_ratio, 3),
        chandelier,
    );
}

fn metric_row(report: &InstrumentReport) -> MetricRow {
    let metrics = &report.metrics;
    let signals = &report.signals;
    let pivot = format!(
        "{} ({})",
        metrics.support.date.format("%Y-%m-%d"),
        if metrics.support.confirmed {
            "pivot"
        } else {
            "min"
        }
    );
    MetricRow {
        symbol: report.symbol.clone(),
        date: metrics.base_date.format("%Y-%m-%d").to_string(),
        close: format!("{:.2}", metrics.close),
        resistance: format!("{:.2}", metrics.resistance),
        support: format!("{:.2}", metrics.support.price),
        pivot,
        ma5: fmt_opt(metrics.ma.ma5, 2),
        ma10: fmt_opt(metrics.ma.ma10, 2),
        ma20: fmt_opt(metrics.ma.ma20, 2),
        ma60: fmt_opt(metrics.ma.ma60, 2),
        atr: fmt_opt(metrics.atr, 3),
        atr_pct: metrics
            .atr_pct
            .map(|pct| format!("{:.2}%", pct * 100.0))
            .unwrap_or_else(|| "-".to_string()),
        volume_avg: fmt_opt(metrics.volume_avg, 1),
        volume_ratio: fmt_opt(signals.volume_ratio_adj, 3),
        score: signals.score.to_string(),
        signal: signals.signal.label().to_string(),
    }
}

fn plan_rows(report: &InstrumentReport) -> Vec<PlanRow> {
    let signals = &report.signals;
    let mut rows = Vec::new();

    let mut push = |setup: &'static str, ladder: &EntryLadder, score: u32, signal: Signal| {
        rows.push(PlanRow {
            symbol: report.symbol.clone(),
            setup,
            buy: format!("{:.3}", ladder.buy),
            stop: format!("{:.3}", ladder.stop),
            risk: format!("{:.3}", ladder.risk),
            t1: format!("{:.3}", ladder.targets[0]),
            t2: format!("{:.3}", ladder.targets[1]),
            t3: format!("{:.3}", ladder.targets[2]),
            score: score.to_string(),
            active: if signals.signal == signal { "*" } else { "" },
        });
    };

    if let Some(plan) = &signals.breakout {
        push(
            "breakout-1",
            &plan.first,
            signals.breakout_score,
            Signal::Breakout,
        );
        push(
            "breakout-2",
            &plan.second,
            signals.breakout_score,
            Signal::Breakout,
        );
    }
    if let Some(plan) = &signals.dip {
        push("dip-1", &plan.first, signals.dip_score, Signal::Dip);
        push("dip-2", &plan.second, signals.dip_score, Signal::Dip);
    }
    if let Some(ladder) = &signals.pullback {
        push(
            "ma20-pullback",
            ladder,
            signals.pullback_score,
            Signal::Pullback,
        );
    }
    rows
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:+.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}
