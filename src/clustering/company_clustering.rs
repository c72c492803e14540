// src/clustering/company_clustering.rs - Blocking-driven union-find clustering

use log::debug;
use std::collections::HashMap;

use super::union_find::DisjointSet;
use crate::matching::blocking::{group_into_blocks, Block};
use crate::matching::confidence::{EMPTY_BASE_CONFIDENCE, EMPTY_BASE_REASON};
use crate::matching::similarity::SimilarityMatcher;
use crate::models::record::Record;

/// Record indices sharing one union-find root, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub root: usize,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// First member in input order.
    pub fn representative(&self) -> usize {
        self.members[0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringOutcome {
    /// Ordered by each cluster's first member.
    pub clusters: Vec<Cluster>,
    pub blocks: usize,
    pub comparisons: usize,
    pub merges: usize,
}

/// Blocks over every record with a non-empty base name.
pub fn build_blocks(records: &[Record]) -> Vec<Block> {
    group_into_blocks(
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.has_base())
            .map(|(idx, r)| (idx, r.block_key.as_str())),
    )
}

/// Compare every pair inside each block, union accepted pairs, and write the
/// final `cluster_id` onto every record.
///
/// Iteration follows input order throughout, so identical input always
/// yields identical assignments.
pub fn cluster_records(records: &mut [Record], matcher: &SimilarityMatcher) -> ClusteringOutcome {
    let blocks = build_blocks(records);
    let mut forest = DisjointSet::new(records.len());
    let mut comparisons = 0;
    let mut merges = 0;

    for block in &blocks {
        for (i, j) in block.pairs() {
            comparisons += 1;
            let Some(outcome) = matcher.compare(&records[i].base_name, &records[j].base_name)
            else {
                continue;
            };
            if forest.union(i, j) {
                merges += 1;
                records[i].raise_confidence(&outcome.score);
                debug!(
                    "Merged rows {} and {} in block {} (ratio={:.3}, token_match={})",
                    records[i].row_order, records[j].row_order, block.key, outcome.ratio, outcome.token_match
                );
            }
        }
    }

    let clusters = finalize_clusters(records, &mut forest);
    ClusteringOutcome {
        clusters,
        blocks: blocks.len(),
        comparisons,
        merges,
    }
}

fn finalize_clusters(records: &mut [Record], forest: &mut DisjointSet) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();

    for idx in 0..records.len() {
        let root = forest.find(idx);
        records[idx].cluster_id = records[root].row_order;

        match position.get(&root) {
            Some(&pos) => clusters[pos].members.push(idx),
            None => {
                position.insert(root, clusters.len());
                clusters.push(Cluster {
                    root,
                    members: vec![idx],
                });
            }
        }

        let record = &mut records[idx];
        if !record.has_base() {
            record.confidence = EMPTY_BASE_CONFIDENCE;
            record.reason = EMPTY_BASE_REASON.to_string();
        }
    }
    clusters
}
