pub mod clustering;
pub mod config;
pub mod engine;
pub mod io;
pub mod matching;
pub mod models;
pub mod utils;
pub mod verification;

pub use config::{ConfigError, EngineConfig, NameTables};
pub use engine::{DedupEngine, DedupRun};
pub use models::{DedupStats, InputRow, Record};
pub use verification::{EnrichmentProvider, Verification, VerificationProvider};
