// src/bin/threshold_sweep.rs - Compare cluster counts across hard thresholds

use anyhow::{Context, Result};
use clap::Parser;
use dedupe_lib::config::EngineConfig;
use dedupe_lib::engine::DedupEngine;
use dedupe_lib::io::input::read_names;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::progress_bars::progress_config::{phase_bar, ProgressConfig};
use log::info;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct SweepArgs {
    /// CSV file holding the company names
    #[arg(long)]
    input: PathBuf,

    /// Column with the names (default: first text column)
    #[arg(long)]
    column: Option<String>,

    /// Lowest hard threshold to try
    #[arg(long, default_value_t = 0.80)]
    from: f64,

    /// Highest hard threshold to try
    #[arg(long, default_value_t = 1.00)]
    to: f64,

    /// Step between thresholds
    #[arg(long, default_value_t = 0.02)]
    step: f64,
}

fn thresholds(from: f64, to: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || from > to {
        return vec![from];
    }
    let steps = ((to - from) / step + 1e-9).floor() as usize;
    (0..=steps)
        .map(|i| ((from + step * i as f64) * 1000.0).round() / 1000.0)
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = SweepArgs::parse();

    let names = read_names(&args.input, args.column.as_deref())?;
    let base_config = EngineConfig::from_env();
    let grid = thresholds(args.from, args.to, args.step);
    info!("Sweeping {} hard thresholds over {} rows", grid.len(), names.rows.len());

    let multi_progress = ProgressConfig::from_env().create_multi_progress();
    let pb = phase_bar(
        multi_progress.as_ref(),
        "  📈 [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}",
        grid.len() as u64,
    );

    println!("hard_threshold,clusters,multi_record_rows");
    for hard in grid {
        pb.set_message(format!("hard={:.2}", hard));
        let config = EngineConfig {
            hard_threshold: hard,
            soft_threshold: base_config.soft_threshold.min(hard),
            ..base_config.clone()
        };
        let engine = DedupEngine::new(config)
            .with_context(|| format!("Invalid configuration for hard={:.2}", hard))?;
        let records = engine.process(&names.rows);

        let clusters = records.iter().map(|r| r.cluster_id).collect::<HashSet<_>>().len();
        let multi = records.iter().filter(|r| r.cluster_size >= 2).count();
        println!("{:.2},{},{}", hard, clusters, multi);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}
