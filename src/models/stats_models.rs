// src/models/stats_models.rs

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::record::Record;

/// Counters and timings for one deduplication run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupStats {
    pub run_id: String,
    pub run_timestamp: NaiveDateTime,
    pub total_rows: usize,
    pub total_clusters: usize,
    /// Rows that share their cluster with at least one other row.
    pub multi_record_clusters: usize,
    pub high_confidence_review_rows: usize,
    pub empty_base_rows: usize,
    pub blocks: usize,
    pub comparisons: usize,
    pub merges: usize,
    pub verified_clusters: usize,
    pub enriched_names: usize,
    pub preparation_time: f64,
    pub clustering_time: f64,
    pub lookup_time: f64,
}

impl DedupStats {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            run_timestamp: Utc::now().naive_utc(),
            total_rows: 0,
            total_clusters: 0,
            multi_record_clusters: 0,
            high_confidence_review_rows: 0,
            empty_base_rows: 0,
            blocks: 0,
            comparisons: 0,
            merges: 0,
            verified_clusters: 0,
            enriched_names: 0,
            preparation_time: 0.0,
            clustering_time: 0.0,
            lookup_time: 0.0,
        }
    }

    /// Recompute the row-derived totals from finished records.
    pub fn record_totals(&mut self, records: &[Record]) {
        self.total_rows = records.len();
        self.total_clusters = records
            .iter()
            .map(|r| r.cluster_id)
            .collect::<HashSet<_>>()
            .len();
        self.multi_record_clusters = records.iter().filter(|r| r.cluster_size >= 2).count();
        self.high_confidence_review_rows = records
            .iter()
            .filter(|r| r.is_high_confidence_duplicate())
            .count();
        self.empty_base_rows = records.iter().filter(|r| !r.has_base()).count();
    }

    pub fn total_time(&self) -> f64 {
        self.preparation_time + self.clustering_time + self.lookup_time
    }
}

impl Default for DedupStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_totals() {
        let mut a = Record::new(0, None, "IBM".into(), "IBM".into(), "I_0_IBM".into());
        let mut b = Record::new(1, None, "IBM".into(), "IBM".into(), "I_0_IBM".into());
        let c = Record::new(2, None, String::new(), String::new(), "NONE".into());
        for r in [&mut a, &mut b] {
            r.cluster_id = 1;
            r.cluster_size = 2;
        }
        a.confidence = 0.98;

        let mut stats = DedupStats::new();
        stats.record_totals(&[a, b, c]);
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.total_clusters, 2);
        assert_eq!(stats.multi_record_clusters, 2);
        assert_eq!(stats.high_confidence_review_rows, 1);
        assert_eq!(stats.empty_base_rows, 1);
    }

    #[test]
    fn test_total_time_sums_phases() {
        let mut stats = DedupStats::new();
        stats.preparation_time = 0.25;
        stats.clustering_time = 1.5;
        stats.lookup_time = 2.0;
        assert_eq!(stats.total_time(), 3.75);
    }
}
