// src/matching/confidence.rs

/// Confidence every non-empty record starts from.
pub const BASE_CONFIDENCE: f64 = 0.70;
/// Confidence pinned on records whose base name is empty.
pub const EMPTY_BASE_CONFIDENCE: f64 = 0.50;

pub const WEAK_MATCH_REASON: &str = "Isolated or weak match";
pub const EMPTY_BASE_REASON: &str = "No base name after cleaning; kept as singleton";

/// Score handed back for one accepted pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScore {
    pub confidence: f64,
    pub reason: &'static str,
}

/// Map a pair's ratio and token-order check to a confidence tier.
pub fn score(ratio: f64, token_match: bool) -> ConfidenceScore {
    let (confidence, reason) = if token_match && ratio >= 0.90 {
        (0.98, "token-sorted match AND ratio >= 0.90")
    } else if ratio >= 0.90 {
        (0.95, "ratio >= 0.90")
    } else if ratio >= 0.85 {
        (0.88, "ratio >= 0.85")
    } else {
        (BASE_CONFIDENCE, WEAK_MATCH_REASON)
    };
    ConfidenceScore { confidence, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_tiers() {
        assert_eq!(score(1.0, true).confidence, 0.98);
        assert_eq!(score(0.90, true).reason, "token-sorted match AND ratio >= 0.90");
        assert_eq!(score(0.93, false).confidence, 0.95);
        assert_eq!(score(0.87, true).confidence, 0.88);
        assert_eq!(score(0.85, false).reason, "ratio >= 0.85");
        assert_eq!(score(0.60, true), ConfidenceScore {
            confidence: BASE_CONFIDENCE,
            reason: WEAK_MATCH_REASON,
        });
    }

    #[test]
    fn test_score_is_monotone_in_ratio() {
        let mut last = 0.0;
        for step in 0..=100 {
            let ratio = step as f64 / 100.0;
            let s = score(ratio, false);
            assert!(s.confidence >= last);
            last = s.confidence;
            assert!(score(ratio, true).confidence >= s.confidence);
        }
    }
}
