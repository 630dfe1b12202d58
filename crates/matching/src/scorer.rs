use concilio_core::{ConfigError, ScoringWeights};

use crate::model::MatchType;

const EXACT_DESCRIPTION_MIN: f64 = 0.9;
const SEMANTIC_DESCRIPTION_MIN: f64 = 0.7;
const WEAK_SIGNAL_MAX: f64 = 0.5;

/// Combines rule and description signals into one confidence in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
    reference_bonus: f64,
}

impl ConfidenceScorer {
    /// Weights are validated here, once; scoring never re-checks them.
    pub fn new(weights: ScoringWeights, reference_bonus: f64) -> Result<Self, ConfigError> {
        weights.validate()?;
        if !reference_bonus.is_finite() || reference_bonus < 0.0 {
            return Err(ConfigError::InvalidTolerance(format!(
                "reference bonus must be a non-negative number, got {reference_bonus}"
            )));
        }
        Ok(Self {
            weights,
            reference_bonus,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn calculate_confidence(
        &self,
        amount_score: f64,
        date_score: f64,
        description_score: f64,
        reference_match: bool,
    ) -> f64 {
        let mut confidence = self.weights.amount_weight * amount_score
            + self.weights.date_weight * date_score
            + self.weights.description_weight * description_score;

        if reference_match {
            confidence += self.reference_bonus;
        }

        confidence.clamp(0.0, 1.0)
    }

    /// First rule wins: exact, fuzzy, semantic, then combined.
    pub fn determine_match_type(
        &self,
        amount_score: f64,
        date_score: f64,
        description_score: f64,
    ) -> MatchType {
        if amount_score == 1.0 && date_score == 1.0 && description_score >= EXACT_DESCRIPTION_MIN {
            return MatchType::Exact;
        }

        if amount_score > 0.0 && date_score > 0.0 && description_score < SEMANTIC_DESCRIPTION_MIN {
            return MatchType::Fuzzy;
        }

        if description_score >= SEMANTIC_DESCRIPTION_MIN
            && (amount_score < WEAK_SIGNAL_MAX || date_score < WEAK_SIGNAL_MAX)
        {
            return MatchType::Semantic;
        }

        MatchType::Combined
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            reference_bonus: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weighted_sum_without_reference() {
        let s = ConfidenceScorer::default();
        assert!(approx(s.calculate_confidence(1.0, 1.0, 0.0, false), 0.5));
        assert!(approx(s.calculate_confidence(0.5, 0.5, 0.5, false), 0.5));
    }

    #[test]
    fn reference_bonus_is_additive() {
        let s = ConfidenceScorer::default();
        assert!(approx(s.calculate_confidence(1.0, 1.0, 0.0, true), 0.6));
    }

    #[test]
    fn confidence_clamps_above_one() {
        let s = ConfidenceScorer::default();
        assert_eq!(s.calculate_confidence(1.0, 1.0, 1.0, true), 1.0);
        let generous = ConfidenceScorer::new(ScoringWeights::default(), 0.9).unwrap();
        assert_eq!(generous.calculate_confidence(0.8, 0.8, 0.8, true), 1.0);
    }

    #[test]
    fn new_rejects_invalid_weights() {
        let bad = ScoringWeights {
            amount_weight: 0.3,
            date_weight: 0.3,
            description_weight: 0.3,
        };
        assert!(matches!(
            ConfidenceScorer::new(bad, 0.1),
            Err(ConfigError::InvalidWeights { .. })
        ));
        assert!(ConfidenceScorer::new(ScoringWeights::default(), -0.1).is_err());
    }

    #[test]
    fn match_type_exact() {
        let s = ConfidenceScorer::default();
        assert_eq!(s.determine_match_type(1.0, 1.0, 0.95), MatchType::Exact);
    }

    #[test]
    fn match_type_fuzzy_when_description_weak() {
        let s = ConfidenceScorer::default();
        assert_eq!(s.determine_match_type(1.0, 1.0, 0.0), MatchType::Fuzzy);
        assert_eq!(s.determine_match_type(0.4, 0.8, 0.69), MatchType::Fuzzy);
    }

    #[test]
    fn match_type_semantic_when_description_carries() {
        let s = ConfidenceScorer::default();
        assert_eq!(s.determine_match_type(0.3, 1.0, 0.8), MatchType::Semantic);
        assert_eq!(s.determine_match_type(1.0, 0.2, 0.7), MatchType::Semantic);
    }

    #[test]
    fn match_type_combined_otherwise() {
        let s = ConfidenceScorer::default();
        assert_eq!(s.determine_match_type(0.8, 0.9, 0.8), MatchType::Combined);
        assert_eq!(s.determine_match_type(1.0, 1.0, 0.85), MatchType::Combined);
    }
}
