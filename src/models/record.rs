// src/models/record.rs

use serde::{Deserialize, Serialize};

use crate::matching::confidence::{
    ConfidenceScore, BASE_CONFIDENCE, EMPTY_BASE_CONFIDENCE, EMPTY_BASE_REASON, WEAK_MATCH_REASON,
};

/// Confidence at or above which a multi-record cluster goes to the review sheet.
pub const HIGH_CONFIDENCE_REVIEW: f64 = 0.95;

/// One raw input row as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub row_order: usize,
    pub name: Option<String>,
}

impl InputRow {
    pub fn new(row_order: usize, name: Option<String>) -> Self {
        Self { row_order, name }
    }

    /// Number a plain list of names 0..n in order.
    pub fn from_names<I, S>(names: I) -> Vec<InputRow>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(row_order, name)| InputRow::new(row_order, Some(name.into())))
            .collect()
    }
}

/// A processed row. Created once per input row and mutated in place by the
/// clustering, canonicalization and lookup phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub row_order: usize,
    pub original_name: Option<String>,
    pub normalized_name: String,
    pub base_name: String,
    pub block_key: String,
    pub cluster_id: usize,
    pub confidence: f64,
    pub reason: String,
    pub canonical_name: String,
    pub cluster_size: usize,
    pub web_canonical: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
}

impl Record {
    pub fn new(
        row_order: usize,
        original_name: Option<String>,
        normalized_name: String,
        base_name: String,
        block_key: String,
    ) -> Self {
        let (confidence, reason) = if base_name.is_empty() {
            (EMPTY_BASE_CONFIDENCE, EMPTY_BASE_REASON)
        } else {
            (BASE_CONFIDENCE, WEAK_MATCH_REASON)
        };
        Self {
            row_order,
            original_name,
            normalized_name,
            base_name,
            block_key,
            cluster_id: row_order,
            confidence,
            reason: reason.to_string(),
            canonical_name: String::new(),
            cluster_size: 1,
            web_canonical: None,
            website: None,
            industry: None,
        }
    }

    pub fn has_base(&self) -> bool {
        !self.base_name.is_empty()
    }

    /// Fold a merge score into the record. Confidence never goes down; the
    /// reason follows whichever score currently holds.
    pub fn raise_confidence(&mut self, score: &ConfidenceScore) -> bool {
        if score.confidence > self.confidence {
            self.confidence = score.confidence;
            self.reason = score.reason.to_string();
            true
        } else {
            false
        }
    }

    pub fn append_reason(&mut self, note: &str) {
        self.reason.push_str(" | ");
        self.reason.push_str(note);
    }

    /// Row belongs on the high-confidence review sheet.
    pub fn is_high_confidence_duplicate(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE_REVIEW && self.cluster_size >= 2
    }
}
