pub mod blocking;
pub mod confidence;
pub mod name;
pub mod similarity;

pub use blocking::{block_key, group_into_blocks, Block, EMPTY_BLOCK_KEY};
pub use confidence::{score, ConfidenceScore};
pub use name::{normalize_name, NameForms, Normalizer};
pub use similarity::{ratio, token_sorted_equal, MatchOutcome, SimilarityMatcher, Thresholds};
