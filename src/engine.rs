// src/engine.rs - End-to-end deduplication over one batch of names

use indicatif::MultiProgress;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clustering::{assign_canonical_names, cluster_records, Cluster};
use crate::config::{ConfigError, EngineConfig};
use crate::matching::blocking::block_key;
use crate::matching::name::Normalizer;
use crate::matching::similarity::{SimilarityMatcher, Thresholds};
use crate::models::record::{InputRow, Record};
use crate::models::stats_models::DedupStats;
use crate::utils::progress_bars::logging::DedupLogger;
use crate::utils::progress_bars::progress_config::phase_bar;
use crate::verification::{
    apply_enrichment, apply_verification, EnrichmentProvider, LookupSettings, VerificationProvider,
};

/// Records in input order plus the counters collected along the way.
#[derive(Debug, Clone)]
pub struct DedupRun {
    pub records: Vec<Record>,
    pub stats: DedupStats,
}

/// A configured deduplication engine.
///
/// Tables and thresholds are fixed at construction; the engine holds no state
/// between runs, so one instance can serve any number of batches.
pub struct DedupEngine {
    config: EngineConfig,
    normalizer: Normalizer,
    matcher: SimilarityMatcher,
    verifier: Option<Arc<dyn VerificationProvider>>,
    enricher: Option<Arc<dyn EnrichmentProvider>>,
    multi_progress: Option<MultiProgress>,
}

impl DedupEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = Normalizer::new(
            &config.tables,
            &config.acronym_overrides,
            !config.disable_subsidiary_fold,
        )?;
        let matcher = SimilarityMatcher::new(Thresholds {
            hard: config.hard_threshold,
            soft: config.soft_threshold,
        });
        Ok(Self {
            config,
            normalizer,
            matcher,
            verifier: None,
            enricher: None,
            multi_progress: None,
        })
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn VerificationProvider>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn EnrichmentProvider>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_progress(mut self, multi_progress: Option<MultiProgress>) -> Self {
        self.multi_progress = multi_progress;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn prepare_record(&self, row: &InputRow) -> Record {
        let forms = self.normalizer.forms(row.name.as_deref());
        let key = block_key(&forms.base, self.config.block_bucket_width);
        Record::new(row.row_order, row.name.clone(), forms.normalized, forms.base, key)
    }

    /// Normalize, block, cluster and name every row. No external calls are
    /// made; output order matches `rows`.
    pub fn process(&self, rows: &[InputRow]) -> Vec<Record> {
        let mut stats = DedupStats::new();
        let (records, _) = self.cluster_phase(rows, &mut stats, &DedupLogger::new());
        records
    }

    /// `process` followed by the verification and enrichment lookups the
    /// configuration asks for.
    pub async fn run(&self, rows: &[InputRow]) -> DedupRun {
        let logger = DedupLogger::new();
        let mut stats = DedupStats::new();
        logger.log_start(
            &stats.run_id,
            rows.len(),
            self.config.verification_enabled || self.config.enrichment_enabled,
        );

        let (mut records, clusters) = self.cluster_phase(rows, &mut stats, &logger);

        let lookup_start = Instant::now();
        let settings = LookupSettings::new(
            self.config.max_concurrent_lookups,
            Duration::from_secs(self.config.lookup_timeout_secs),
        );

        if self.config.verification_enabled {
            match &self.verifier {
                Some(verifier) => {
                    logger.log_phase("Verifying low-confidence clusters", None);
                    let started = Instant::now();
                    let pb = phase_bar(
                        self.multi_progress.as_ref(),
                        "  🌐 [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} Verifying clusters...",
                        0,
                    );
                    stats.verified_clusters =
                        apply_verification(&mut records, &clusters, verifier.as_ref(), settings, &pb)
                            .await;
                    pb.finish_and_clear();
                    logger.log_lookup_results("Verification", stats.verified_clusters, started.elapsed());
                }
                None => logger.log_warning("Verification enabled but no provider configured; skipping"),
            }
        }

        if self.config.enrichment_enabled {
            match &self.enricher {
                Some(enricher) => {
                    logger.log_phase("Enriching canonical names", None);
                    let started = Instant::now();
                    let pb = phase_bar(
                        self.multi_progress.as_ref(),
                        "  🏷️  [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} Enriching names...",
                        0,
                    );
                    stats.enriched_names =
                        apply_enrichment(&mut records, enricher.as_ref(), settings, &pb).await;
                    pb.finish_and_clear();
                    logger.log_lookup_results("Enrichment", stats.enriched_names, started.elapsed());
                }
                None => logger.log_warning("Enrichment enabled but no provider configured; skipping"),
            }
        }
        stats.lookup_time = lookup_start.elapsed().as_secs_f64();

        stats.record_totals(&records);
        logger.log_completion(&stats);
        DedupRun { records, stats }
    }

    fn cluster_phase(
        &self,
        rows: &[InputRow],
        stats: &mut DedupStats,
        logger: &DedupLogger,
    ) -> (Vec<Record>, Vec<Cluster>) {
        let start = Instant::now();
        logger.log_phase("Normalizing names", Some(&format!("{} rows", rows.len())));
        let mut records: Vec<Record> = rows.iter().map(|row| self.prepare_record(row)).collect();
        stats.preparation_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        logger.log_phase("Clustering", None);
        let thresholds = self.matcher.thresholds();
        logger.log_debug(&format!(
            "Matching with hard={:.2}, soft={:.2}",
            thresholds.hard, thresholds.soft
        ));
        let outcome = cluster_records(&mut records, &self.matcher);
        logger.log_blocks(outcome.blocks, outcome.comparisons);
        assign_canonical_names(&mut records, &outcome.clusters);
        logger.log_clusters(records.len(), outcome.clusters.len(), outcome.merges);

        stats.blocks = outcome.blocks;
        stats.comparisons = outcome.comparisons;
        stats.merges = outcome.merges;
        stats.clustering_time = start.elapsed().as_secs_f64();
        stats.record_totals(&records);

        (records, outcome.clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::Verification;
    use anyhow::Result;
    use async_trait::async_trait;

    fn engine() -> DedupEngine {
        DedupEngine::new(EngineConfig::default()).unwrap()
    }

    fn members_of(records: &[Record], cluster_id: usize) -> Vec<usize> {
        records
            .iter()
            .filter(|r| r.cluster_id == cluster_id)
            .map(|r| r.row_order)
            .collect()
    }

    #[test]
    fn test_acronyms_and_suffixes_cluster_together() {
        let rows = InputRow::from_names([
            "IBM India Pvt Ltd",
            "IBM",
            "TCS",
            "Tata Consultancy Services Limited",
            "Ltd",
        ]);
        let records = engine().process(&rows);

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].base_name, "IBM");
        assert_eq!(records[2].base_name, "TATA CONSULTANCY SERVICES");
        assert_eq!(records[3].block_key, "T_5_TATA");

        assert_eq!(records[0].cluster_id, records[1].cluster_id);
        assert_eq!(members_of(&records, records[0].cluster_id), vec![0, 1]);
        assert_eq!(records[2].cluster_id, records[3].cluster_id);
        assert_eq!(members_of(&records, records[2].cluster_id), vec![2, 3]);
        assert_ne!(records[0].cluster_id, records[2].cluster_id);

        assert_eq!(records[0].confidence, 0.98);
        assert_eq!(records[0].canonical_name, "IBM");
        assert_eq!(records[3].canonical_name, "TATA CONSULTANCY SERVICES");
        assert_eq!(records[1].cluster_size, 2);

        let ltd = &records[4];
        assert_eq!(ltd.base_name, "");
        assert_eq!(ltd.block_key, "NONE");
        assert_eq!(ltd.cluster_size, 1);
        assert_eq!(ltd.confidence, 0.50);
        assert_eq!(ltd.reason, "No base name after cleaning; kept as singleton");
        assert_eq!(ltd.canonical_name, "LTD");
    }

    #[test]
    fn test_shared_first_word_does_not_merge_distinct_companies() {
        let rows = InputRow::from_names([
            "American Express",
            "American Airlines",
            "General Motors",
            "General Mills",
        ]);
        let records = engine().process(&rows);

        // same blocks, so the pairs were compared and rejected
        assert_eq!(records[0].block_key, records[1].block_key);
        assert_eq!(records[2].block_key, records[3].block_key);
        assert!(records.iter().all(|r| r.cluster_size == 1));
        assert!(records.iter().all(|r| r.confidence == 0.70));
        assert_eq!(records[1].canonical_name, "AMERICAN AIRLINES");
        assert_eq!(records[3].canonical_name, "GENERAL MILLS");
    }

    #[test]
    fn test_strict_hard_threshold_keeps_typos_apart() {
        let config = EngineConfig {
            hard_threshold: 1.0,
            ..EngineConfig::default()
        };
        let records = DedupEngine::new(config)
            .unwrap()
            .process(&InputRow::from_names(["GOGLE", "GOOGLE"]));
        assert_ne!(records[0].cluster_id, records[1].cluster_id);
        assert!(records.iter().all(|r| r.cluster_size == 1));
    }

    #[test]
    fn test_empty_and_missing_names() {
        let rows = vec![InputRow::new(0, Some(String::new())), InputRow::new(1, None)];
        let records = engine().process(&rows);
        for r in &records {
            assert_eq!(r.normalized_name, "");
            assert_eq!(r.base_name, "");
            assert_eq!(r.block_key, "NONE");
            assert_eq!(r.confidence, 0.50);
            assert_eq!(r.cluster_size, 1);
            assert_eq!(r.canonical_name, "");
        }
        assert_eq!(records[1].original_name, None);
    }

    #[test]
    fn test_process_is_deterministic_and_keeps_order() {
        let rows = vec![
            InputRow::new(10, Some("Acme Corp LLC".into())),
            InputRow::new(11, Some("ACME CORP".into())),
            InputRow::new(12, Some("Zeta Holdings".into())),
            InputRow::new(13, Some("Acme Corp. Inc.".into())),
        ];
        let first = engine().process(&rows);
        let second = engine().process(&rows);
        assert_eq!(first, second);
        let order: Vec<usize> = first.iter().map(|r| r.row_order).collect();
        assert_eq!(order, vec![10, 11, 12, 13]);
        assert_eq!(members_of(&first, first[0].cluster_id), vec![10, 11, 13]);
    }

    #[test]
    fn test_subsidiary_fold_can_be_disabled() {
        let config = EngineConfig {
            disable_subsidiary_fold: true,
            ..EngineConfig::default()
        };
        let engine = DedupEngine::new(config).unwrap();
        let record = engine.prepare_record(&InputRow::new(0, Some("Apple India Pvt Ltd".into())));
        assert_eq!(record.base_name, "APPLE INDIA");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            soft_threshold: 1.5,
            ..EngineConfig::default()
        };
        assert!(matches!(
            DedupEngine::new(config),
            Err(ConfigError::ThresholdOutOfRange { name: "soft_threshold", .. })
        ));
    }

    struct AlphabetVerifier;

    #[async_trait]
    impl VerificationProvider for AlphabetVerifier {
        async fn verify(&self, name: &str) -> Result<Option<Verification>> {
            Ok((name == "GOOGLE").then(|| Verification {
                name: "Alphabet Inc".to_string(),
                reason: "parent company".to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn test_run_skips_confident_clusters() {
        let config = EngineConfig {
            verification_enabled: true,
            ..EngineConfig::default()
        };
        let engine = DedupEngine::new(config)
            .unwrap()
            .with_verifier(Arc::new(AlphabetVerifier));
        let run = engine
            .run(&InputRow::from_names(["Google LLC", "Google Inc", "Microsoft"]))
            .await;

        // the exact GOOGLE merge puts the representative at 0.98
        assert_eq!(run.records[0].confidence, 0.98);
        assert_eq!(run.stats.verified_clusters, 0);
        assert_eq!(run.stats.total_rows, 3);
        assert_eq!(run.stats.total_clusters, 2);
        assert!(run.records.iter().all(|r| r.web_canonical.is_none()));
    }

    #[tokio::test]
    async fn test_run_verifies_weak_singletons() {
        let config = EngineConfig {
            verification_enabled: true,
            ..EngineConfig::default()
        };
        let engine = DedupEngine::new(config)
            .unwrap()
            .with_verifier(Arc::new(AlphabetVerifier));
        let run = engine.run(&InputRow::from_names(["Google", "Microsoft"])).await;

        assert_eq!(run.stats.verified_clusters, 1);
        let google = &run.records[0];
        assert_eq!(google.web_canonical.as_deref(), Some("ALPHABET INC"));
        assert_eq!(google.cluster_size, 1);
        assert!(google.reason.ends_with(" | Web verified: ALPHABET INC (parent company)"));
        assert_eq!(run.records[1].web_canonical, None);
    }

    #[tokio::test]
    async fn test_run_without_provider_skips_lookups() {
        let config = EngineConfig {
            verification_enabled: true,
            enrichment_enabled: true,
            ..EngineConfig::default()
        };
        let engine = DedupEngine::new(config).unwrap();
        let rows = InputRow::from_names(["Google", "Google LLC"]);
        let run = engine.run(&rows).await;
        assert_eq!(run.records, engine.process(&rows));
        assert_eq!(run.stats.verified_clusters, 0);
        assert_eq!(run.stats.enriched_names, 0);
    }
}
