use concilio_core::{ClassifierConfig, ConfigError, Money, Transaction, TransactionSource};
use concilio_match::Match;
use rust_decimal::Decimal;

use crate::model::{DiscrepancyType, Severity};

/// Relative amount differences above these are critical / high.
const CRITICAL_PERCENT: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
const HIGH_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const DATE_HIGH_DAYS: i64 = 30;
const DATE_MEDIUM_DAYS: i64 = 14;

/// Amounts at or above `large * VERY_LARGE_FACTOR` are suspicious on their own.
const VERY_LARGE_FACTOR: i64 = 10;
/// 1,000.00 and 10,000.00, in cents.
const ROUND_NUMBER_STEP_CENTS: i64 = 100_000;
const ROUND_NUMBER_FLOOR_CENTS: i64 = 1_000_000;

/// Where an amount sits relative to the large-amount threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeBand {
    /// `>= large`
    Large,
    /// `>= large / 10`
    Notable,
    Small,
}

/// Assigns severities and machine reasons from fixed rules. Pure: the same
/// inputs always produce the same classification.
#[derive(Debug, Clone, Default)]
pub struct DiscrepancyClassifier {
    config: ClassifierConfig,
}

impl DiscrepancyClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn size_band(&self, amount: Money) -> SizeBand {
        let large = self.config.large_amount_threshold;
        if amount >= large {
            SizeBand::Large
        } else if amount >= large / 10 {
            SizeBand::Notable
        } else {
            SizeBand::Small
        }
    }

    /// Type follows the transaction's source; severity follows its size.
    pub fn classify_missing(&self, tx: &Transaction) -> (DiscrepancyType, Severity, String) {
        let severity = match self.size_band(tx.amount) {
            SizeBand::Large => Severity::Critical,
            SizeBand::Notable => Severity::High,
            SizeBand::Small => Severity::Medium,
        };

        match tx.source {
            TransactionSource::Bank => (
                DiscrepancyType::MissingInLedger,
                severity,
                format!("Bank transaction not found in ledger: {}", tx.description),
            ),
            TransactionSource::Ledger => (
                DiscrepancyType::MissingInBank,
                severity,
                format!(
                    "Ledger transaction not found in bank statement: {}",
                    tx.description
                ),
            ),
        }
    }

    /// Severity from the absolute difference and its share of the left amount.
    pub fn classify_amount_mismatch(
        &self,
        m: &Match,
        left: &Transaction,
        right: &Transaction,
    ) -> (Severity, String) {
        let diff = m.amount_difference.abs();
        let percent = diff.ratio(left.amount).unwrap_or(Decimal::ZERO);
        let tolerance = self.config.amount_tolerance;

        let severity = if diff >= self.config.large_amount_threshold || percent > CRITICAL_PERCENT {
            Severity::Critical
        } else if diff >= tolerance * 2 || percent > HIGH_PERCENT {
            Severity::High
        } else if diff > tolerance {
            Severity::Medium
        } else {
            Severity::Low
        };

        let reason = format!(
            "Amount mismatch: {} shows {}, {} shows {} (difference: {}, {:.1}%)",
            left.source.label(),
            left.amount,
            right.source.label(),
            right.amount,
            diff,
            percent * Decimal::ONE_HUNDRED,
        );

        (severity, reason)
    }

    pub fn classify_date_mismatch(
        &self,
        m: &Match,
        left: &Transaction,
        right: &Transaction,
    ) -> (Severity, String) {
        let days = m.date_difference_days.abs();

        let severity = if days > DATE_HIGH_DAYS {
            Severity::High
        } else if days > DATE_MEDIUM_DAYS {
            Severity::Medium
        } else {
            Severity::Low
        };

        let reason = format!(
            "Date mismatch: {} date {}, {} date {} (difference: {} days)",
            left.source.label(),
            left.date,
            right.source.label(),
            right.date,
            days,
        );

        (severity, reason)
    }

    /// Severity from the group's combined amount.
    pub fn classify_duplicate(&self, group: &[&Transaction]) -> (Severity, String) {
        let total: Money = group.iter().map(|tx| tx.amount).sum();

        let severity = match self.size_band(total) {
            SizeBand::Large => Severity::High,
            SizeBand::Notable => Severity::Medium,
            SizeBand::Small => Severity::Low,
        };

        let reason = format!(
            "Duplicate transaction detected: {} occurrences of same transaction (total: {})",
            group.len(),
            total,
        );

        (severity, reason)
    }

    /// `None` when no indicator fires.
    pub fn classify_suspicious(&self, tx: &Transaction) -> Option<(Severity, String)> {
        let mut indicators = Vec::new();

        if tx.amount >= self.config.large_amount_threshold * VERY_LARGE_FACTOR {
            indicators.push("very large amount");
        }

        if tx.amount >= Money::from_cents(ROUND_NUMBER_FLOOR_CENTS)
            && tx.amount.is_multiple_of(Money::from_cents(ROUND_NUMBER_STEP_CENTS))
        {
            indicators.push("suspicious round number");
        }

        if tx.date > self.config.today() {
            indicators.push("future date");
        }

        if indicators.is_empty() {
            return None;
        }

        let severity = if tx.amount >= self.config.large_amount_threshold {
            Severity::Critical
        } else {
            Severity::High
        };

        Some((
            severity,
            format!("Suspicious pattern detected: {}", indicators.join(", ")),
        ))
    }
}
