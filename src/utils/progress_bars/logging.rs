// src/utils/progress_bars/logging.rs - Logging helpers for deduplication runs
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::models::stats_models::DedupStats;

#[derive(Clone)]
pub struct DedupLogger {
    stage_name: &'static str,
    stage_emoji: &'static str,
    start_time: Instant,
}

impl Default for DedupLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupLogger {
    pub fn new() -> Self {
        Self {
            stage_name: "DEDUP",
            stage_emoji: "🏢",
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, run_id: &str, total_rows: usize, lookups_enabled: bool) {
        info!(
            "[{}] {} 🚀 Starting deduplication of {} names (run ID: {}){}",
            self.stage_name,
            self.stage_emoji,
            total_rows,
            run_id,
            if lookups_enabled { " with external lookups" } else { " (offline)" }
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.get_elapsed();
        let msg = if let Some(details) = details {
            format!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.stage_name, self.stage_emoji, phase, details, elapsed.as_secs_f32()
            )
        } else {
            format!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.stage_name, self.stage_emoji, phase, elapsed.as_secs_f32()
            )
        };
        info!("{}", msg);
    }

    pub fn log_blocks(&self, blocks: usize, comparisons: usize) {
        info!(
            "[{}] {} 📦 {} blocks → {} pairwise comparisons",
            self.stage_name, self.stage_emoji, blocks, comparisons
        );
    }

    pub fn log_clusters(&self, total_rows: usize, clusters: usize, merges: usize) {
        info!(
            "[{}] {} ✅ Clustering complete: {} rows → {} clusters ({} merges)",
            self.stage_name, self.stage_emoji, total_rows, clusters, merges
        );
    }

    pub fn log_lookup_results(&self, kind: &str, applied: usize, elapsed: Duration) {
        info!(
            "[{}] {} 🌐 {}: {} applied in {:.1}s",
            self.stage_name, self.stage_emoji, kind, applied, elapsed.as_secs_f32()
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] {} ⚠️  {}", self.stage_name, self.stage_emoji, message);
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {} 🔍 {}", self.stage_name, self.stage_emoji, message);
    }

    pub fn log_completion(&self, stats: &DedupStats) {
        info!(
            "[{}] {} 🎉 Completed in {:.2}s: {} rows, {} clusters, {} rows in multi-record clusters, {} high-confidence review rows",
            self.stage_name,
            self.stage_emoji,
            stats.total_time(),
            stats.total_rows,
            stats.total_clusters,
            stats.multi_record_clusters,
            stats.high_confidence_review_rows
        );
        if stats.empty_base_rows > 0 {
            warn!(
                "[{}] {} 🚫 {} rows had no base name after cleaning",
                self.stage_name, self.stage_emoji, stats.empty_base_rows
            );
        }
    }

    pub fn get_elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
