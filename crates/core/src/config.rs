use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Money;

/// Allowed drift of the weight sum away from 1.0.
const WEIGHT_SUM_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Scoring weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
    #[error("Weight {name} must be a non-negative number, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },
    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Tolerances used by the rule scorer when pairing transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub amount_tolerance: Money,
    /// Fraction of the average amount, e.g. `0.01` = 1%.
    pub amount_tolerance_percent: f64,
    pub date_window_days: i64,
    pub require_same_type: bool,
    pub reference_match_bonus: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: Money::from_cents(500),
            amount_tolerance_percent: 0.01,
            date_window_days: 7,
            require_same_type: true,
            reference_match_bonus: 0.10,
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amount_tolerance < Money::zero() {
            return Err(ConfigError::InvalidTolerance(format!(
                "amount_tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }
        if !self.amount_tolerance_percent.is_finite() || self.amount_tolerance_percent < 0.0 {
            return Err(ConfigError::InvalidTolerance(format!(
                "amount_tolerance_percent must be a non-negative number, got {}",
                self.amount_tolerance_percent
            )));
        }
        if self.date_window_days < 0 {
            return Err(ConfigError::InvalidTolerance(format!(
                "date_window_days must not be negative, got {}",
                self.date_window_days
            )));
        }
        if !self.reference_match_bonus.is_finite() || self.reference_match_bonus < 0.0 {
            return Err(ConfigError::InvalidTolerance(format!(
                "reference_match_bonus must be a non-negative number, got {}",
                self.reference_match_bonus
            )));
        }
        Ok(())
    }
}

/// Weights of the three base signals. Must sum to 1.0; the reference bonus is
/// added on top and is not part of the sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub amount_weight: f64,
    pub date_weight: f64,
    pub description_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            amount_weight: 0.30,
            date_weight: 0.20,
            description_weight: 0.50,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.amount_weight + self.date_weight + self.description_weight
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("amount_weight", self.amount_weight),
            ("date_weight", self.date_weight),
            ("description_weight", self.description_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Thresholds used by the discrepancy detector and classifier. Kept separate
/// from [`MatchingConfig`]; the two may disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub amount_tolerance: Money,
    pub date_window_days: i64,
    pub large_amount_threshold: Money,
    /// Reference date for the future-date check. `None` means today (local time).
    pub as_of: Option<NaiveDate>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: Money::from_cents(500),
            date_window_days: 7,
            large_amount_threshold: Money::from_cents(1_000_000),
            as_of: None,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amount_tolerance < Money::zero() {
            return Err(ConfigError::InvalidTolerance(format!(
                "classifier amount_tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }
        if self.date_window_days < 0 {
            return Err(ConfigError::InvalidTolerance(format!(
                "classifier date_window_days must not be negative, got {}",
                self.date_window_days
            )));
        }
        if !self.large_amount_threshold.is_positive() {
            return Err(ConfigError::InvalidTolerance(format!(
                "large_amount_threshold must be positive, got {}",
                self.large_amount_threshold
            )));
        }
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityKind {
    #[default]
    Exact,
    Levenshtein,
    TokenOverlap,
}

impl std::str::FromStr for SimilarityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(SimilarityKind::Exact),
            "levenshtein" => Ok(SimilarityKind::Levenshtein),
            "token-overlap" | "token_overlap" => Ok(SimilarityKind::TokenOverlap),
            other => Err(format!("Unknown similarity kind: '{other}'")),
        }
    }
}

/// Everything one reconciliation run needs, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub min_confidence: f64,
    pub similarity: SimilarityKind,
    pub cache_similarity: bool,
    pub matching: MatchingConfig,
    pub weights: ScoringWeights,
    pub classifier: ClassifierConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            similarity: SimilarityKind::default(),
            cache_similarity: true,
            matching: MatchingConfig::default(),
            weights: ScoringWeights::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ReconConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ReconConfig =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidTolerance(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        self.matching.validate()?;
        self.weights.validate()?;
        self.classifier.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!((ScoringWeights::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let w = ScoringWeights {
            amount_weight: 0.5,
            date_weight: 0.5,
            description_weight: 0.5,
        };
        assert!(matches!(w.validate(), Err(ConfigError::InvalidWeights { .. })));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let w = ScoringWeights {
            amount_weight: -0.2,
            date_weight: 0.7,
            description_weight: 0.5,
        };
        assert!(matches!(
            w.validate(),
            Err(ConfigError::NegativeWeight { name: "amount_weight", .. })
        ));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let cfg = MatchingConfig {
            amount_tolerance: Money::from_cents(-1),
            ..MatchingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidTolerance(_))));
    }

    #[test]
    fn classifier_as_of_overrides_today() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let cfg = ClassifierConfig {
            as_of: Some(day),
            ..ClassifierConfig::default()
        };
        assert_eq!(cfg.today(), day);
    }

    #[test]
    fn from_toml_fills_defaults() {
        let cfg = ReconConfig::from_toml("min_confidence = 0.5\n").unwrap();
        assert_eq!(cfg.min_confidence, 0.5);
        assert_eq!(cfg.matching, MatchingConfig::default());
        assert_eq!(cfg.similarity, SimilarityKind::Exact);
        assert!(cfg.cache_similarity);
    }

    #[test]
    fn from_toml_reads_sections() {
        let toml = r#"
            similarity = "token-overlap"

            [matching]
            amount_tolerance = "2.50"
            date_window_days = 3
            require_same_type = false

            [weights]
            amount_weight = 0.4
            date_weight = 0.2
            description_weight = 0.4

            [classifier]
            large_amount_threshold = "5000.00"
            as_of = "2024-12-31"
        "#;
        let cfg = ReconConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.similarity, SimilarityKind::TokenOverlap);
        assert_eq!(cfg.matching.amount_tolerance, Money::from_cents(250));
        assert_eq!(cfg.matching.date_window_days, 3);
        assert!(!cfg.matching.require_same_type);
        assert_eq!(cfg.weights.amount_weight, 0.4);
        assert_eq!(cfg.classifier.large_amount_threshold, Money::from_cents(500_000));
        assert_eq!(cfg.classifier.amount_tolerance, Money::from_cents(500));
        assert_eq!(
            cfg.classifier.as_of,
            Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        );
    }

    #[test]
    fn from_toml_rejects_bad_weights() {
        let toml = "[weights]\namount_weight = 0.9\n";
        assert!(matches!(
            ReconConfig::from_toml(toml),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn from_toml_reports_parse_errors() {
        assert!(matches!(
            ReconConfig::from_toml("min_confidence = \"high\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn similarity_kind_from_str() {
        assert_eq!("Levenshtein".parse::<SimilarityKind>(), Ok(SimilarityKind::Levenshtein));
        assert_eq!("token_overlap".parse::<SimilarityKind>(), Ok(SimilarityKind::TokenOverlap));
        assert!("cosine".parse::<SimilarityKind>().is_err());
    }
}
