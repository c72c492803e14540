//! Boundary to external name-verification and enrichment services.
//!
//! The engine only sees these traits; concrete providers live next to them
//! (`ollama`) and tests plug in canned fakes.

pub mod merge;
pub mod ollama;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use merge::{apply_enrichment, apply_verification, Enrichment, VERIFY_BELOW_CONFIDENCE};
pub use ollama::{OllamaConfig, OllamaProvider};

/// Replacement canonical name proposed by a verification provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub name: String,
    pub reason: String,
}

/// Looks up the official name behind a base name.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// `Ok(None)` when the provider has nothing to say.
    async fn verify(&self, name: &str) -> Result<Option<Verification>>;
}

/// Domain and industry lookups for a canonical name.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn find_domain(&self, name: &str) -> Result<Option<String>>;
    async fn classify_industry(&self, name: &str) -> Result<Option<String>>;
}

/// Worker pool bounds shared by both lookup phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSettings {
    pub max_concurrent: usize,
    pub timeout: Duration,
}

impl LookupSettings {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }
}
