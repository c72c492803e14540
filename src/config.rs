// src/config.rs - Engine configuration, injected name tables and validation

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_HARD_THRESHOLD: f64 = 0.90;
pub const DEFAULT_SOFT_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 5;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BLOCK_BUCKET_WIDTH: usize = 5;

const DEFAULT_SUFFIXES: [&str; 26] = [
    "PRIVATE LIMITED", "PVT LTD", "PVT. LTD.", "LTD", "LIMITED", "LLC", "LLP", "PLC", "INC",
    "INCORPORATED", "CO", "CO.", "COMPANY", "PTE LTD", "GMBH", "GMBH & CO KG", "B.V.", "A/S",
    "S.A. DE C.V.", "SP Z O O", "SP ZOO", "S R L", "S.R.L.", "S A", "S.P.A.", "SA DE CV",
];

const DEFAULT_COUNTRIES: [&str; 20] = [
    "INDIA", "USA", "UAE", "CHINA", "JAPAN", "KOREA", "SINGAPORE", "MALAYSIA", "CANADA", "BRAZIL",
    "GERMANY", "FRANCE", "ITALY", "UNITED STATES", "UNITED KINGDOM", "HONG KONG", "NEW ZEALAND",
    "SOUTH AFRICA", "SAUDI ARABIA", "COTE DIVOIRE",
];

const DEFAULT_ACRONYMS: [(&str, &str); 3] = [
    ("IBM INDIA", "IBM"),
    ("TCS", "TATA CONSULTANCY SERVICES"),
    ("HDFC", "HDFC BANK"),
];

/// Errors raised while building an engine from a configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite value in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("max_concurrent_lookups must be at least 1")]
    ZeroWorkerPool,
    #[error("lookup_timeout_secs must be at least 1")]
    ZeroTimeout,
    #[error("block_bucket_width must be at least 1")]
    ZeroBucketWidth,
    #[error("acronym mapping has an empty key (value: '{0}')")]
    EmptyAcronymKey(String),
    #[error("malformed acronym override '{0}', expected KEY->VALUE")]
    MalformedOverride(String),
    #[error("invalid name pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Suffix, country and acronym tables used by the normalizer.
///
/// These are plain data handed to each engine at construction, so two engines
/// with different tables can run side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameTables {
    /// Legal-entity suffixes stripped from the end of a name.
    pub suffixes: Vec<String>,
    /// Trailing geographic tokens removed by subsidiary folding.
    pub countries: Vec<String>,
    /// Whole-name substitutions applied after stripping.
    pub acronyms: BTreeMap<String, String>,
}

impl Default for NameTables {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            countries: DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect(),
            acronyms: DEFAULT_ACRONYMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Configuration for a deduplication run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum ratio for a match regardless of token order
    pub hard_threshold: f64,
    /// Minimum ratio for a match when the token-sorted forms are equal
    pub soft_threshold: f64,
    /// Skip stripping of trailing country tokens
    pub disable_subsidiary_fold: bool,
    /// Caller mappings merged over the built-in acronyms
    pub acronym_overrides: BTreeMap<String, String>,
    /// Consult the verification provider for low-confidence clusters
    pub verification_enabled: bool,
    /// Look up domain and industry per canonical name
    pub enrichment_enabled: bool,
    /// Worker pool size for provider calls
    pub max_concurrent_lookups: usize,
    /// Per-call timeout for provider calls
    pub lookup_timeout_secs: u64,
    /// Width of the length bucket inside the block key
    pub block_bucket_width: usize,
    pub tables: NameTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hard_threshold: DEFAULT_HARD_THRESHOLD,
            soft_threshold: DEFAULT_SOFT_THRESHOLD,
            disable_subsidiary_fold: false,
            acronym_overrides: BTreeMap::new(),
            verification_enabled: false,
            enrichment_enabled: false,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            block_bucket_width: DEFAULT_BLOCK_BUCKET_WIDTH,
            tables: NameTables::default(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let acronym_overrides = match env::var("DEDUP_ACRONYM_OVERRIDES") {
            Ok(raw) => parse_acronym_overrides(&raw).unwrap_or_else(|e| {
                warn!("Ignoring DEDUP_ACRONYM_OVERRIDES: {}", e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        let config = Self {
            hard_threshold: env_or("DEDUP_HARD_THRESHOLD", defaults.hard_threshold),
            soft_threshold: env_or("DEDUP_SOFT_THRESHOLD", defaults.soft_threshold),
            disable_subsidiary_fold: env_or(
                "DEDUP_DISABLE_SUBSIDIARY_FOLD",
                defaults.disable_subsidiary_fold,
            ),
            acronym_overrides,
            verification_enabled: env_or("DEDUP_VERIFICATION_ENABLED", defaults.verification_enabled),
            enrichment_enabled: env_or("DEDUP_ENRICHMENT_ENABLED", defaults.enrichment_enabled),
            max_concurrent_lookups: env_or(
                "DEDUP_MAX_CONCURRENT_LOOKUPS",
                defaults.max_concurrent_lookups,
            ),
            lookup_timeout_secs: env_or("DEDUP_LOOKUP_TIMEOUT_SECS", defaults.lookup_timeout_secs),
            block_bucket_width: env_or("DEDUP_BLOCK_BUCKET_WIDTH", defaults.block_bucket_width),
            tables: defaults.tables,
        };

        debug!("Engine config from env: {:?}", config);
        config
    }

    /// Reject values that would produce meaningless clusters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("hard_threshold", self.hard_threshold)?;
        check_threshold("soft_threshold", self.soft_threshold)?;
        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::ZeroWorkerPool);
        }
        if self.lookup_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.block_bucket_width == 0 {
            return Err(ConfigError::ZeroBucketWidth);
        }
        for (key, value) in self.tables.acronyms.iter().chain(self.acronym_overrides.iter()) {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyAcronymKey(value.clone()));
            }
        }
        if self.soft_threshold > self.hard_threshold {
            // Still valid, the soft branch just never adds anything.
            warn!(
                "soft_threshold ({:.2}) is above hard_threshold ({:.2}); token-sorted matches gain nothing",
                self.soft_threshold, self.hard_threshold
            );
        }
        Ok(())
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!(
            "⚙️  Thresholds: hard={:.2}, soft={:.2}",
            self.hard_threshold, self.soft_threshold
        );
        info!(
            "   Subsidiary folding: {}",
            if self.disable_subsidiary_fold { "DISABLED" } else { "enabled" }
        );
        if !self.acronym_overrides.is_empty() {
            info!("   Acronym overrides: {:?}", self.acronym_overrides);
        }
        info!(
            "   Verification: {}, enrichment: {} (pool={}, timeout={}s)",
            self.verification_enabled,
            self.enrichment_enabled,
            self.max_concurrent_lookups,
            self.lookup_timeout_secs
        );
    }
}

/// Parse `"GE->GENERAL ELECTRIC; P&G->PROCTER & GAMBLE"` into an upper-cased map.
pub fn parse_acronym_overrides(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut overrides = BTreeMap::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once("->")
            .ok_or_else(|| ConfigError::MalformedOverride(pair.to_string()))?;
        let key = key.trim().to_uppercase();
        let value = value.trim().to_uppercase();
        if key.is_empty() {
            return Err(ConfigError::EmptyAcronymKey(value));
        }
        if value.is_empty() || value.contains("->") {
            return Err(ConfigError::MalformedOverride(pair.to_string()));
        }
        overrides.insert(key, value);
    }
    Ok(overrides)
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
