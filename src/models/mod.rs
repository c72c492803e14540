pub mod record;
pub mod stats_models;

pub use record::{InputRow, Record};
pub use stats_models::DedupStats;
