mod analysis;
mod config;
mod data;
mod loader;
mod output;
mod runner;

use anyhow::{bail, Result};
use clap::Parser;

use config::AppConfig;
use output::print_report;
use runner::run_batch;

fn main() -> Result<()> {
    let config = AppConfig::parse();
    run(&config)
}

fn run(config: &AppConfig) -> Result<()> {
    if config.pivot_k == 0 {
        bail!("pivot confirmation width must be at least 1");
    }
    if config.res_lookback == 0 {
        bail!("resistance lookback must be at least 1");
    }

    let outcome = run_batch(config)?;
    println!(
        "Evaluated {} of {} instruments",
        outcome.reports.len(),
        config.inputs.len()
    );

    print_report(&outcome);

    if outcome.reports.is_empty() {
        bail!("all {} inputs failed", outcome.failures.len());
    }
    Ok(())
}
