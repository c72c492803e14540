// src/io/output.rs - Writing run results to an output directory

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::engine::DedupEngine;
use crate::models::record::Record;
use crate::models::stats_models::DedupStats;

/// Paths of every file written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub clusters: PathBuf,
    pub canonical_summary: PathBuf,
    pub golden_mapping: PathBuf,
    pub high_confidence_review: PathBuf,
    pub settings: PathBuf,
    pub run_summary: PathBuf,
}

impl OutputFiles {
    fn in_dir(dir: &Path) -> Self {
        Self {
            clusters: dir.join("clusters.csv"),
            canonical_summary: dir.join("canonical_summary.csv"),
            golden_mapping: dir.join("golden_mapping.csv"),
            high_confidence_review: dir.join("high_confidence_review.csv"),
            settings: dir.join("settings.json"),
            run_summary: dir.join("run_summary.json"),
        }
    }
}

/// Effective settings of a run, written next to the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub hard_threshold: f64,
    pub soft_threshold: f64,
    pub disable_subsidiary_fold: bool,
    pub acronym_overrides: BTreeMap<String, String>,
    pub verification_enabled: bool,
    pub enrichment_enabled: bool,
    pub max_concurrent_lookups: usize,
    pub lookup_timeout_secs: u64,
    pub block_bucket_width: usize,
    pub suffix_list_size: usize,
    pub preserved_all_rows: bool,
}

impl SettingsSnapshot {
    pub fn new(engine: &DedupEngine, input_rows: usize, output_rows: usize) -> Self {
        let config = engine.config();
        Self {
            hard_threshold: config.hard_threshold,
            soft_threshold: config.soft_threshold,
            disable_subsidiary_fold: config.disable_subsidiary_fold,
            acronym_overrides: config.acronym_overrides.clone(),
            verification_enabled: config.verification_enabled,
            enrichment_enabled: config.enrichment_enabled,
            max_concurrent_lookups: config.max_concurrent_lookups,
            lookup_timeout_secs: config.lookup_timeout_secs,
            block_bucket_width: config.block_bucket_width,
            suffix_list_size: engine.normalizer().suffix_count(),
            preserved_all_rows: input_rows == output_rows,
        }
    }
}

#[derive(Debug, Serialize)]
struct ClusterRow<'a> {
    row_order: usize,
    original_name: Option<&'a str>,
    normalized_name: &'a str,
    base_name: &'a str,
    cluster_id: usize,
    cluster_size: usize,
    canonical_name: &'a str,
    confidence: f64,
    reason: &'a str,
    web_canonical: Option<&'a str>,
    website: Option<&'a str>,
    industry: Option<&'a str>,
}

impl<'a> From<&'a Record> for ClusterRow<'a> {
    fn from(r: &'a Record) -> Self {
        Self {
            row_order: r.row_order,
            original_name: r.original_name.as_deref(),
            normalized_name: &r.normalized_name,
            base_name: &r.base_name,
            cluster_id: r.cluster_id,
            cluster_size: r.cluster_size,
            canonical_name: &r.canonical_name,
            confidence: r.confidence,
            reason: &r.reason,
            web_canonical: r.web_canonical.as_deref(),
            website: r.website.as_deref(),
            industry: r.industry.as_deref(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CanonicalSummaryRow<'a> {
    cluster_id: usize,
    canonical_name: &'a str,
    count: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct GoldenMappingRow<'a> {
    row_order: usize,
    original_name: Option<&'a str>,
    canonical_name: &'a str,
}

/// Write every result file into `dir`, creating it when needed.
pub fn write_outputs(
    dir: &Path,
    records: &[Record],
    stats: &DedupStats,
    settings: &SettingsSnapshot,
) -> Result<OutputFiles> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let files = OutputFiles::in_dir(dir);

    write_csv(&files.clusters, records.iter().map(ClusterRow::from))?;
    write_csv(&files.canonical_summary, canonical_summary(records))?;
    write_csv(&files.golden_mapping, golden_mapping(records))?;

    let mut review: Vec<&Record> = records
        .iter()
        .filter(|r| r.is_high_confidence_duplicate())
        .collect();
    review.sort_by_key(|r| r.row_order);
    write_csv(
        &files.high_confidence_review,
        review.into_iter().map(ClusterRow::from),
    )?;

    write_json(&files.settings, settings)?;
    write_json(&files.run_summary, stats)?;

    info!("💾 Results written to {}", dir.display());
    Ok(files)
}

/// One row per cluster in order of first appearance.
fn canonical_summary(records: &[Record]) -> Vec<CanonicalSummaryRow<'_>> {
    let mut rows: Vec<CanonicalSummaryRow> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();
    for record in records {
        match position.get(&record.cluster_id) {
            Some(&pos) => rows[pos].count += 1,
            None => {
                position.insert(record.cluster_id, rows.len());
                rows.push(CanonicalSummaryRow {
                    cluster_id: record.cluster_id,
                    canonical_name: &record.canonical_name,
                    count: 1,
                });
            }
        }
    }
    rows
}

/// One row per input row, aligned with `clusters.csv`.
fn golden_mapping(records: &[Record]) -> Vec<GoldenMappingRow<'_>> {
    records
        .iter()
        .map(|r| GoldenMappingRow {
            row_order: r.row_order,
            original_name: r.original_name.as_deref(),
            canonical_name: &r.canonical_name,
        })
        .collect()
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
