use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::analysis::{compute_metrics, evaluate, session_progress, EvalContext, SignalConfig};
use crate::config::AppConfig;
use crate::data::InstrumentReport;
use crate::loader::load_bars_from_csv;

/// Result of a batch run: per-instrument reports in input order, with
/// failures captured separately so one bad file never sinks the rest.
pub struct BatchOutcome {
    pub reports: Vec<InstrumentReport>,
    pub failures: Vec<(String, anyhow::Error)>,
}

/// Evaluate every input file on a fixed-size worker pool and merge the
/// results after the join, preserving the input order.
pub fn run_batch(config: &AppConfig) -> Result<BatchOutcome> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .context("failed to build the worker pool")?;

    let progress = session_progress(config.elapsed_minutes);
    let signal_config = SignalConfig {
        threshold: config.signal_threshold,
        ..SignalConfig::default()
    };

    let results: Vec<(String, Result<InstrumentReport>)> = pool.install(|| {
        config
            .inputs
            .par_iter()
            .map(|path| {
                let symbol = symbol_for(path);
                let report = analyze_instrument(path, &symbol, progress, config, &signal_config);
                (symbol, report)
            })
            .collect()
    });

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => failures.push((symbol, err)),
        }
    }
    Ok(BatchOutcome { reports, failures })
}

fn analyze_instrument(
    path: &Path,
    symbol: &str,
    progress: f64,
    config: &AppConfig,
    signal_config: &SignalConfig,
) -> Result<InstrumentReport> {
    let bars = load_bars_from_csv(path)
        .with_context(|| format!("failed to load input data from {:?}", path))?;
    let metrics = compute_metrics(&bars, config)
        .ok_or_else(|| anyhow!("no bars left to evaluate for {symbol}"))?;
    let ctx = EvalContext {
        progress,
        ..EvalContext::default()
    };
    let signals = evaluate(&metrics, ctx, signal_config);
    Ok(InstrumentReport {
        symbol: symbol.to_string(),
        bars: bars.len(),
        metrics,
        signals,
    })
}

fn symbol_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
