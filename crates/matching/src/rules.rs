use chrono::NaiveDate;
use concilio_core::{MatchingConfig, Money, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Per-pair signals produced by [`RuleScorer::evaluate`] for a viable pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleScores {
    pub amount_score: f64,
    pub date_score: f64,
    pub reference_match: bool,
    pub amount_difference: Money,
    pub date_difference_days: i64,
}

/// Amount / date / reference scoring between two transactions.
pub struct RuleScorer {
    config: MatchingConfig,
}

impl RuleScorer {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Returns `(score, |a - b|)`.
    ///
    /// Within the absolute tolerance the score decays linearly over
    /// `tolerance + one minor unit`, so a difference equal to the tolerance
    /// still scores above zero. Past it, the percentage tolerance (relative to
    /// the average of both amounts) gets a chance before the score drops to 0.
    pub fn amount_score(&self, a: Money, b: Money) -> (f64, Money) {
        let difference = a.abs_diff(b);

        if difference.is_zero() {
            return (1.0, difference);
        }

        if difference <= self.config.amount_tolerance {
            let span = self.config.amount_tolerance + Money::MINOR_UNIT;
            let score = difference
                .ratio(span)
                .map(|r| Decimal::ONE - r)
                .and_then(|s| s.to_f64())
                .unwrap_or(0.0);
            return (score.max(0.0), difference);
        }

        if let Some(percent_diff) = percent_of_average(difference, a, b) {
            let tolerance = self.config.amount_tolerance_percent;
            if tolerance > 0.0 && percent_diff <= tolerance {
                let score = 1.0 - percent_diff / tolerance;
                return (score.max(0.0), difference);
            }
        }

        (0.0, difference)
    }

    /// Returns `(score, |d1 - d2| in days)`; linear decay across the window.
    pub fn date_score(&self, d1: NaiveDate, d2: NaiveDate) -> (f64, i64) {
        let days = (d1 - d2).num_days().abs();

        if days == 0 {
            return (1.0, days);
        }

        let window = self.config.date_window_days;
        if window > 0 && days <= window {
            let score = 1.0 - days as f64 / window as f64;
            return (score.max(0.0), days);
        }

        (0.0, days)
    }

    /// Case-insensitive exact or substring match; absent references never match.
    pub fn reference_match(r1: Option<&str>, r2: Option<&str>) -> bool {
        let (Some(r1), Some(r2)) = (r1, r2) else {
            return false;
        };

        let r1 = r1.trim().to_uppercase();
        let r2 = r2.trim().to_uppercase();
        if r1.is_empty() || r2.is_empty() {
            return false;
        }

        r1 == r2 || r1.contains(&r2) || r2.contains(&r1)
    }

    /// Cheap prefilter that skips hopeless pairs. Passing it is not acceptance.
    pub fn can_match(&self, tx1: &Transaction, tx2: &Transaction) -> bool {
        if self.config.require_same_type && tx1.transaction_type != tx2.transaction_type {
            return false;
        }

        let date_diff = (tx1.date - tx2.date).num_days().abs();
        if date_diff > self.config.date_window_days {
            return false;
        }

        let amount_diff = tx1.amount.abs_diff(tx2.amount);
        if amount_diff > self.config.amount_tolerance * 2 {
            // Twice the percentage tolerance as the second chance.
            if let Some(percent_diff) = percent_of_average(amount_diff, tx1.amount, tx2.amount) {
                if percent_diff > self.config.amount_tolerance_percent * 2.0 {
                    return false;
                }
            }
        }

        true
    }

    /// Scores a pair. `None` unless both the amount and the date score are
    /// above zero, whatever the descriptions say.
    pub fn evaluate(&self, tx1: &Transaction, tx2: &Transaction) -> Option<RuleScores> {
        if !self.can_match(tx1, tx2) {
            return None;
        }

        let (amount_score, amount_difference) = self.amount_score(tx1.amount, tx2.amount);
        let (date_score, date_difference_days) = self.date_score(tx1.date, tx2.date);
        let reference_match =
            Self::reference_match(tx1.reference.as_deref(), tx2.reference.as_deref());

        if amount_score > 0.0 && date_score > 0.0 {
            Some(RuleScores {
                amount_score,
                date_score,
                reference_match,
                amount_difference,
                date_difference_days,
            })
        } else {
            None
        }
    }
}

/// `difference / avg(a, b)` as a fraction, `None` when the average is zero.
fn percent_of_average(difference: Money, a: Money, b: Money) -> Option<f64> {
    let average = (a + b) / 2;
    difference.ratio(average).and_then(|r| r.to_f64())
}
