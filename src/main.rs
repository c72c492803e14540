use anyhow::{Context, Result};
use clap::Parser;
use dedupe_lib::config::{parse_acronym_overrides, EngineConfig};
use dedupe_lib::engine::DedupEngine;
use dedupe_lib::io::input::read_names;
use dedupe_lib::io::output::{write_outputs, SettingsSnapshot};
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::get_memory_usage;
use dedupe_lib::utils::progress_bars::progress_config::{phase_bar, ProgressConfig};
use dedupe_lib::verification::{OllamaConfig, OllamaProvider};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file holding the company names
    #[arg(long)]
    input: PathBuf,

    /// Column with the names (default: first text column)
    #[arg(long)]
    column: Option<String>,

    /// Directory for the result files
    #[arg(long, default_value = "dedupe_output")]
    output_dir: PathBuf,

    /// Hard similarity threshold
    #[arg(long)]
    hard: Option<f64>,

    /// Soft threshold, used when token-sorted names are equal
    #[arg(long)]
    soft: Option<f64>,

    /// Keep trailing country names ("APPLE INDIA" stays apart from "APPLE")
    #[arg(long)]
    no_subsidiary_fold: bool,

    /// Extra acronym mappings, e.g. "GE->GENERAL ELECTRIC; P&G->PROCTER & GAMBLE"
    #[arg(long)]
    add_map: Option<String>,

    /// Ask the LLM to verify low-confidence clusters
    #[arg(long)]
    web_verify: bool,

    /// Look up website and industry for every canonical name
    #[arg(long)]
    enrich: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();
    info!("Starting company name deduplication");

    let mut config = EngineConfig::from_env();
    if let Some(hard) = args.hard {
        config.hard_threshold = hard;
    }
    if let Some(soft) = args.soft {
        config.soft_threshold = soft;
    }
    if args.no_subsidiary_fold {
        config.disable_subsidiary_fold = true;
    }
    if let Some(raw) = &args.add_map {
        let overrides = parse_acronym_overrides(raw).context("Invalid --add-map value")?;
        config.acronym_overrides.extend(overrides);
    }
    config.verification_enabled |= args.web_verify;
    config.enrichment_enabled |= args.enrich;
    config.log_config();

    let progress_config = ProgressConfig::from_env();
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = phase_bar(
        multi_progress.as_ref(),
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        3,
    );
    let update_main_pb_message = |step: &str| {
        if progress_config.should_show_memory() {
            main_pb.set_message(format!("{} (Memory: {} MB)", step, get_memory_usage()));
        } else {
            main_pb.set_message(step.to_string());
        }
    };

    let start = Instant::now();
    update_main_pb_message("Loading input");
    let names = read_names(&args.input, args.column.as_deref())?;
    main_pb.inc(1);

    let lookups = config.verification_enabled || config.enrichment_enabled;
    let mut engine = DedupEngine::new(config)
        .context("Invalid deduplication configuration")?
        .with_progress(if progress_config.should_show_detailed() {
            multi_progress.clone()
        } else {
            None
        });
    if lookups {
        let provider = Arc::new(OllamaProvider::new(OllamaConfig::from_env())?);
        info!(
            "Using OLLAMA at {} with model {}",
            provider.config().url,
            provider.config().model
        );
        if engine.config().verification_enabled {
            engine = engine.with_verifier(provider.clone());
        }
        if engine.config().enrichment_enabled {
            engine = engine.with_enricher(provider);
        }
    }

    update_main_pb_message("Deduplicating");
    let run = engine.run(&names.rows).await;
    main_pb.inc(1);

    update_main_pb_message("Writing results");
    let settings = SettingsSnapshot::new(&engine, names.rows.len(), run.records.len());
    let files = write_outputs(&args.output_dir, &run.records, &run.stats, &settings)
        .context("Failed to write results")?;
    main_pb.inc(1);
    main_pb.finish_with_message("Done");

    info!("Clusters: {}", files.clusters.display());
    info!("High-confidence review: {}", files.high_confidence_review.display());
    info!(
        "Finished in {:.2?}: {} rows → {} clusters ({} rows in multi-record clusters)",
        start.elapsed(),
        run.stats.total_rows,
        run.stats.total_clusters,
        run.stats.multi_record_clusters
    );
    if progress_config.should_show_memory() {
        info!("Memory in use: {} MB", get_memory_usage());
    }
    Ok(())
}
