use std::collections::HashMap;

use chrono::NaiveDate;
use concilio_core::{ClassifierConfig, ConfigError, Money, Transaction, TransactionSource};
use concilio_match::{Match, MatchResult};

use crate::classifier::DiscrepancyClassifier;
use crate::model::{Discrepancy, DiscrepancyResult, DiscrepancyType, Severity};

/// Leading characters of the trimmed, uppercased description in a duplicate key.
const DUPLICATE_KEY_CHARS: usize = 50;

fn suggested_action(discrepancy_type: DiscrepancyType) -> &'static str {
    match discrepancy_type {
        DiscrepancyType::MissingInLedger => "Verify transaction was recorded in ledger",
        DiscrepancyType::MissingInBank => "Verify transaction appears in bank statement",
        DiscrepancyType::AmountMismatch => "Investigate amount difference - may be fees or errors",
        DiscrepancyType::DateMismatch => "Verify posting dates - may be timing difference",
        DiscrepancyType::Duplicate => "Remove duplicate entry",
        DiscrepancyType::PossibleFraud => "Review transaction for potential fraud or error",
    }
}

fn statement_label(source: TransactionSource) -> &'static str {
    match source {
        TransactionSource::Bank => "Bank statement",
        TransactionSource::Ledger => "Ledger",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DuplicateKey {
    amount: Money,
    date: NaiveDate,
    description: String,
}

impl DuplicateKey {
    fn of(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            date: tx.date,
            description: tx
                .description
                .trim()
                .to_uppercase()
                .chars()
                .take(DUPLICATE_KEY_CHARS)
                .collect(),
        }
    }
}

/// Turns a matching outcome into classified discrepancies.
#[derive(Debug, Clone, Default)]
pub struct DiscrepancyDetector {
    classifier: DiscrepancyClassifier,
}

impl DiscrepancyDetector {
    pub fn new(classifier: DiscrepancyClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(DiscrepancyClassifier::new(config)?))
    }

    pub fn classifier(&self) -> &DiscrepancyClassifier {
        &self.classifier
    }

    /// Runs every pass in order: missing, amount mismatches, date mismatches,
    /// duplicates, then suspicious patterns. A transaction can be reported by
    /// more than one pass.
    pub fn detect(
        &self,
        left: &[Transaction],
        right: &[Transaction],
        result: &MatchResult,
    ) -> DiscrepancyResult {
        let left_by_id = index_by_id(left);
        let right_by_id = index_by_id(right);

        let mut discrepancies = Vec::new();

        self.detect_missing(&result.unmatched_left, &left_by_id, &mut discrepancies);
        self.detect_missing(&result.unmatched_right, &right_by_id, &mut discrepancies);

        for m in &result.matches {
            let (Some(l), Some(r)) = (
                left_by_id.get(m.left_id.as_str()),
                right_by_id.get(m.right_id.as_str()),
            ) else {
                tracing::warn!(
                    left_id = %m.left_id,
                    right_id = %m.right_id,
                    "Match refers to unknown transaction, skipping"
                );
                continue;
            };
            if let Some(d) = self.amount_mismatch(m, l, r) {
                discrepancies.push(d);
            }
        }

        for m in &result.matches {
            let (Some(l), Some(r)) = (
                left_by_id.get(m.left_id.as_str()),
                right_by_id.get(m.right_id.as_str()),
            ) else {
                continue;
            };
            if let Some(d) = self.date_mismatch(m, l, r) {
                discrepancies.push(d);
            }
        }

        self.detect_duplicates(left, &mut discrepancies);
        self.detect_duplicates(right, &mut discrepancies);

        for tx in left.iter().chain(right) {
            if let Some(d) = self.suspicious(tx) {
                discrepancies.push(d);
            }
        }

        let result = DiscrepancyResult::from_discrepancies(discrepancies);
        tracing::info!(
            total = result.total(),
            critical = result.count_of_severity(Severity::Critical),
            high = result.count_of_severity(Severity::High),
            "Discrepancy detection complete"
        );
        result
    }

    fn detect_missing(
        &self,
        unmatched: &[String],
        by_id: &HashMap<&str, &Transaction>,
        out: &mut Vec<Discrepancy>,
    ) {
        for id in unmatched {
            let Some(tx) = by_id.get(id.as_str()) else {
                tracing::warn!(transaction_id = %id, "Unmatched id not found in input, skipping");
                continue;
            };
            let (discrepancy_type, severity, reason) = self.classifier.classify_missing(tx);
            out.push(
                Discrepancy::for_transaction(tx, discrepancy_type, severity, reason)
                    .with_suggested_action(suggested_action(discrepancy_type)),
            );
        }
    }

    /// Reported on the left transaction when the matched amounts differ by
    /// more than the classifier's own tolerance.
    fn amount_mismatch(
        &self,
        m: &Match,
        left: &Transaction,
        right: &Transaction,
    ) -> Option<Discrepancy> {
        let diff = m.amount_difference.abs();
        if diff <= self.classifier.config().amount_tolerance {
            return None;
        }

        let (severity, reason) = self.classifier.classify_amount_mismatch(m, left, right);
        tracing::debug!(
            left_id = %left.id,
            right_id = %right.id,
            %diff,
            %severity,
            "Amount mismatch"
        );

        let mut d =
            Discrepancy::for_transaction(left, DiscrepancyType::AmountMismatch, severity, reason)
                .related_to(&right.id)
                .with_suggested_action(suggested_action(DiscrepancyType::AmountMismatch));
        d.expected_amount = Some(right.amount);
        d.actual_amount = Some(left.amount);
        d.amount_difference = Some(diff);
        Some(d)
    }

    fn date_mismatch(
        &self,
        m: &Match,
        left: &Transaction,
        right: &Transaction,
    ) -> Option<Discrepancy> {
        let days = m.date_difference_days.abs();
        if days <= self.classifier.config().date_window_days {
            return None;
        }

        let (severity, reason) = self.classifier.classify_date_mismatch(m, left, right);
        tracing::debug!(
            left_id = %left.id,
            right_id = %right.id,
            days,
            %severity,
            "Date mismatch"
        );

        let mut d =
            Discrepancy::for_transaction(left, DiscrepancyType::DateMismatch, severity, reason)
                .related_to(&right.id)
                .with_suggested_action(suggested_action(DiscrepancyType::DateMismatch));
        d.expected_date = Some(right.date);
        d.actual_date = Some(left.date);
        d.date_difference_days = Some(days);
        Some(d)
    }

    /// Groups one side by (amount, date, description prefix). Every member
    /// after the first of a group of two or more is reported, pointing back
    /// at the first.
    fn detect_duplicates(&self, side: &[Transaction], out: &mut Vec<Discrepancy>) {
        let mut groups: Vec<Vec<&Transaction>> = Vec::new();
        let mut index: HashMap<DuplicateKey, usize> = HashMap::new();

        for tx in side {
            let key = DuplicateKey::of(tx);
            match index.get(&key) {
                Some(&i) => groups[i].push(tx),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![tx]);
                }
            }
        }

        for group in groups.iter().filter(|g| g.len() > 1) {
            let (severity, reason) = self.classifier.classify_duplicate(group);
            let first = group[0];
            for tx in &group[1..] {
                let reason = format!("{reason} - {}", statement_label(tx.source));
                out.push(
                    Discrepancy::for_transaction(tx, DiscrepancyType::Duplicate, severity, reason)
                        .related_to(&first.id)
                        .with_suggested_action(suggested_action(DiscrepancyType::Duplicate)),
                );
            }
        }
    }

    fn suspicious(&self, tx: &Transaction) -> Option<Discrepancy> {
        let (severity, reason) = self.classifier.classify_suspicious(tx)?;
        Some(
            Discrepancy::for_transaction(tx, DiscrepancyType::PossibleFraud, severity, reason)
                .with_suggested_action(suggested_action(DiscrepancyType::PossibleFraud)),
        )
    }
}

fn index_by_id(transactions: &[Transaction]) -> HashMap<&str, &Transaction> {
    transactions.iter().map(|tx| (tx.id.as_str(), tx)).collect()
}
