// src/verification/merge.rs - Bounded concurrent lookups merged back after a barrier

use futures::future::ready;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use tokio::time::{error::Elapsed, timeout};

use super::{EnrichmentProvider, LookupSettings, Verification, VerificationProvider};
use crate::clustering::company_clustering::Cluster;
use crate::models::record::Record;

/// Clusters whose representative sits below this are sent for verification.
pub const VERIFY_BELOW_CONFIDENCE: f64 = 0.90;

type Answer<T> = Result<anyhow::Result<T>, Elapsed>;

/// Ask the provider about every low-confidence cluster and annotate members
/// with the answer. Membership and sizes are left untouched.
///
/// Returns the number of clusters annotated.
pub async fn apply_verification(
    records: &mut [Record],
    clusters: &[Cluster],
    provider: &dyn VerificationProvider,
    settings: LookupSettings,
    progress: &ProgressBar,
) -> usize {
    let eligible: Vec<(usize, String)> = clusters
        .iter()
        .filter_map(|cluster| {
            let representative = &records[cluster.representative()];
            (representative.has_base() && representative.confidence < VERIFY_BELOW_CONFIDENCE)
                .then(|| (cluster.root, representative.base_name.clone()))
        })
        .collect();
    if eligible.is_empty() {
        return 0;
    }
    progress.set_length(eligible.len() as u64);

    let answers: HashMap<usize, Verification> = stream::iter(eligible)
        .map(|(root, base)| async move {
            let answer = timeout(settings.timeout, provider.verify(&base)).await;
            progress.inc(1);
            accept_verification(&base, answer).map(|verification| (root, verification))
        })
        .buffer_unordered(settings.max_concurrent)
        .filter_map(ready)
        .collect()
        .await;

    // Every call has finished; only now touch the records.
    let mut annotated = 0;
    for cluster in clusters {
        let Some(verification) = answers.get(&cluster.root) else {
            continue;
        };
        let note = verification_note(verification);
        for &idx in &cluster.members {
            records[idx].web_canonical = Some(verification.name.clone());
            records[idx].append_reason(&note);
        }
        annotated += 1;
    }
    annotated
}

fn accept_verification(base: &str, answer: Answer<Option<Verification>>) -> Option<Verification> {
    match answer {
        Err(_) => {
            warn!("Verification timed out for '{}'", base);
            None
        }
        Ok(Err(e)) => {
            warn!("Verification failed for '{}': {:#}", base, e);
            None
        }
        Ok(Ok(None)) => {
            debug!("No verification answer for '{}'", base);
            None
        }
        Ok(Ok(Some(verification))) => {
            let name = verification.name.trim().to_uppercase();
            if name.is_empty() || name == base.to_uppercase() {
                return None;
            }
            Some(Verification {
                name,
                reason: verification.reason.trim().to_string(),
            })
        }
    }
}

fn verification_note(verification: &Verification) -> String {
    if verification.reason.is_empty() {
        format!("Web verified: {}", verification.name)
    } else {
        format!("Web verified: {} ({})", verification.name, verification.reason)
    }
}

/// Domain and industry found for one canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub website: Option<String>,
    pub industry: Option<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.website.is_none() && self.industry.is_none()
    }
}

/// One domain and one industry lookup per distinct canonical name, applied to
/// every record carrying that name. Returns the number of names enriched.
pub async fn apply_enrichment(
    records: &mut [Record],
    provider: &dyn EnrichmentProvider,
    settings: LookupSettings,
    progress: &ProgressBar,
) -> usize {
    let mut seen = HashSet::new();
    let names: Vec<String> = records
        .iter()
        .map(|r| r.canonical_name.clone())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect();
    if names.is_empty() {
        return 0;
    }
    progress.set_length(names.len() as u64);

    let found: HashMap<String, Enrichment> = stream::iter(names)
        .map(|name| async move {
            let (domain, industry) = futures::join!(
                timeout(settings.timeout, provider.find_domain(&name)),
                timeout(settings.timeout, provider.classify_industry(&name)),
            );
            progress.inc(1);
            let enrichment = Enrichment {
                website: settle("domain", &name, domain),
                industry: settle("industry", &name, industry),
            };
            (name, enrichment)
        })
        .buffer_unordered(settings.max_concurrent)
        .filter(|(_, enrichment)| ready(!enrichment.is_empty()))
        .collect()
        .await;

    for record in records.iter_mut() {
        if let Some(enrichment) = found.get(&record.canonical_name) {
            record.website = enrichment.website.clone();
            record.industry = enrichment.industry.clone();
        }
    }
    found.len()
}

fn settle(kind: &str, name: &str, answer: Answer<Option<String>>) -> Option<String> {
    match answer {
        Err(_) => {
            warn!("{} lookup timed out for '{}'", kind, name);
            None
        }
        Ok(Err(e)) => {
            warn!("{} lookup failed for '{}': {:#}", kind, name, e);
            None
        }
        Ok(Ok(value)) => value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    }
}
