// src/clustering/canonical.rs - Canonical name selection per cluster

use std::collections::HashMap;

use super::company_clustering::Cluster;
use crate::models::record::Record;

/// Most frequent non-empty base name among the members; ties go to the
/// shortest, then to the earliest row. With no base names at all, the first
/// member's normalized name is used.
pub fn select_canonical(records: &[Record], members: &[usize]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for &idx in members {
        let base = records[idx].base_name.as_str();
        if base.is_empty() {
            continue;
        }
        let count = counts.entry(base).or_insert(0);
        if *count == 0 {
            first_seen.push(base);
        }
        *count += 1;
    }

    let Some(max_freq) = counts.values().copied().max() else {
        return members
            .first()
            .map(|&idx| records[idx].normalized_name.clone())
            .unwrap_or_default();
    };

    // min_by_key keeps the first of equal keys, i.e. the earliest row.
    first_seen
        .into_iter()
        .filter(|base| counts[base] == max_freq)
        .min_by_key(|base| base.chars().count())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Write `canonical_name` and `cluster_size` onto every member.
pub fn assign_canonical_names(records: &mut [Record], clusters: &[Cluster]) {
    for cluster in clusters {
        let canonical = select_canonical(records, &cluster.members);
        let size = cluster.size();
        for &idx in &cluster.members {
            records[idx].canonical_name = canonical.clone();
            records[idx].cluster_size = size;
        }
    }
}
