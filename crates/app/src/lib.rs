//! `concilio`: reconciles a bank statement against a ledger.
//!
//! [`Reconciler`] wires the matching engine and the discrepancy detector from
//! one [`ReconConfig`] and runs them in sequence. The `concilio` binary is a
//! thin CLI over it.

pub mod load;
pub mod report;

use concilio_core::{ConfigError, ReconConfig, Transaction};
use concilio_detect::DiscrepancyDetector;
use concilio_match::{provider_for, MatchingEngine, SimilarityProvider};

pub use load::{parse_transactions, read_config, read_transactions, LoadError};
pub use report::{ReconciliationReport, RunSummary};

/// Matching engine plus detector, built once from a validated config.
///
/// With `cache_similarity` on, the similarity memo lives as long as the
/// reconciler and is shared by every [`Reconciler::run`]. Cached scores are
/// pure functions of the text pair, so reuse never changes a report, but the
/// memo keeps growing. Long-lived callers feeding unrelated statements should
/// build a fresh reconciler per batch.
pub struct Reconciler {
    engine: MatchingEngine<Box<dyn SimilarityProvider>>,
    detector: DiscrepancyDetector,
    min_confidence: f64,
}

impl Reconciler {
    /// Builds the engine and detector. All configuration errors surface here,
    /// never during a run.
    pub fn from_config(config: ReconConfig) -> Result<Self, ConfigError> {
        let similarity = provider_for(config.similarity, config.cache_similarity);
        Self::with_similarity(config, similarity)
    }

    /// Like [`Reconciler::from_config`] but with a caller-supplied similarity
    /// provider; `config.similarity` is ignored.
    pub fn with_similarity(
        config: ReconConfig,
        similarity: Box<dyn SimilarityProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = MatchingEngine::new(config.matching, config.weights, similarity)?;
        let detector = DiscrepancyDetector::from_config(config.classifier)?;
        Ok(Self {
            engine,
            detector,
            min_confidence: config.min_confidence,
        })
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn run(&self, bank: &[Transaction], ledger: &[Transaction]) -> ReconciliationReport {
        let matches = self.engine.find_matches(bank, ledger, self.min_confidence);
        let discrepancies = self.detector.detect(bank, ledger, &matches);
        let summary = RunSummary::new(bank.len(), ledger.len(), &matches, &discrepancies);

        tracing::info!(
            matched = summary.matched_count,
            discrepancies = summary.discrepancy_count,
            match_rate = summary.match_rate,
            "Reconciliation complete"
        );

        ReconciliationReport {
            summary,
            matches,
            discrepancies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use concilio_core::{Money, SimilarityKind, TransactionSource, TransactionType};

    fn tx(id: &str, source: TransactionSource, date: &str, cents: i64, desc: &str) -> Transaction {
        Transaction::new(
            id,
            source,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            Money::from_cents(cents),
            TransactionType::Debit,
            desc,
        )
        .unwrap()
    }

    fn config() -> ReconConfig {
        let mut config = ReconConfig::default();
        config.classifier.as_of = NaiveDate::from_ymd_opt(2024, 12, 31);
        config
    }

    #[test]
    fn summary_counts_and_rate() {
        let bank = vec![
            tx("b1", TransactionSource::Bank, "2024-02-01", 2_500, "LUNCH"),
            tx("b2", TransactionSource::Bank, "2024-02-02", 9_900, "GYM"),
        ];
        let ledger = vec![
            tx("l1", TransactionSource::Ledger, "2024-02-01", 2_500, "LUNCH"),
            tx("l2", TransactionSource::Ledger, "2024-04-01", 1_000, "BOOK"),
            tx("l3", TransactionSource::Ledger, "2024-05-01", 1_200, "TAXI"),
            tx("l4", TransactionSource::Ledger, "2024-06-01", 1_300, "CINEMA"),
        ];
        let report = Reconciler::from_config(config()).unwrap().run(&bank, &ledger);

        assert_eq!(report.summary.bank_count, 2);
        assert_eq!(report.summary.ledger_count, 4);
        assert_eq!(report.summary.matched_count, 1);
        assert_eq!(report.summary.unmatched_bank_count, 1);
        assert_eq!(report.summary.unmatched_ledger_count, 3);
        assert_eq!(report.summary.discrepancy_count, 4);
        assert_eq!(report.summary.match_rate, 0.25);
    }

    #[test]
    fn empty_run_is_not_an_error() {
        let report = Reconciler::from_config(config()).unwrap().run(&[], &[]);
        assert_eq!(report.summary.match_rate, 0.0);
        assert!(report.matches.matches.is_empty());
        assert_eq!(report.discrepancies.total(), 0);
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let mut bad = config();
        bad.weights.description_weight = 0.9;
        assert!(matches!(
            Reconciler::from_config(bad),
            Err(ConfigError::InvalidWeights { .. })
        ));

        let mut bad = config();
        bad.min_confidence = 1.5;
        assert!(Reconciler::from_config(bad).is_err());
    }

    #[test]
    fn configured_similarity_changes_outcome() {
        // Same amount and date, differently worded descriptions.
        let bank = vec![tx(
            "b1",
            TransactionSource::Bank,
            "2024-03-03",
            4_599,
            "AMAZON MKTPLACE PMTS",
        )];
        let ledger = vec![tx(
            "l1",
            TransactionSource::Ledger,
            "2024-03-03",
            4_599,
            "AMAZON MKTPLACE",
        )];

        let mut strict = config();
        strict.min_confidence = 0.8;
        let report = Reconciler::from_config(strict.clone()).unwrap().run(&bank, &ledger);
        assert_eq!(report.summary.matched_count, 0);

        strict.similarity = SimilarityKind::Levenshtein;
        let report = Reconciler::from_config(strict).unwrap().run(&bank, &ledger);
        assert_eq!(report.summary.matched_count, 1);
    }

    #[test]
    fn repeated_runs_share_cache_without_changing_results() {
        let mut cached = config();
        cached.similarity = SimilarityKind::Levenshtein;
        cached.min_confidence = 0.5;
        let reconciler = Reconciler::from_config(cached.clone()).unwrap();

        let bank = vec![
            tx("b1", TransactionSource::Bank, "2024-03-03", 4_599, "AMAZON MKTPLACE PMTS"),
            tx("b2", TransactionSource::Bank, "2024-03-04", 1_250, "CORNER DELI"),
        ];
        let ledger = vec![
            tx("l1", TransactionSource::Ledger, "2024-03-03", 4_599, "AMAZON MKTPLACE"),
            tx("l2", TransactionSource::Ledger, "2024-03-05", 1_250, "DELI"),
        ];

        let first = reconciler.run(&bank, &ledger);
        let second = reconciler.run(&bank, &ledger);
        assert_eq!(first, second);

        cached.cache_similarity = false;
        let uncached = Reconciler::from_config(cached).unwrap().run(&bank, &ledger);
        assert_eq!(first, uncached);
    }

    #[test]
    fn report_serializes_to_plain_json() {
        let bank = vec![tx("b1", TransactionSource::Bank, "2024-02-01", 2_500, "LUNCH")];
        let report = Reconciler::from_config(config()).unwrap().run(&bank, &[]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summary"]["unmatched_bank_count"], 1);
        assert_eq!(value["matches"]["unmatched_left"][0], "b1");
        assert_eq!(
            value["discrepancies"]["discrepancies"][0]["discrepancy_type"],
            "missing_in_ledger"
        );
        assert_eq!(value["discrepancies"]["discrepancies"][0]["amount"], "25.00");
    }
}
