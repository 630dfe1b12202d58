use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use concilio_core::{Money, Transaction, TransactionSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyType {
    /// Bank transaction with no ledger counterpart.
    MissingInLedger,
    /// Ledger transaction with no bank counterpart.
    MissingInBank,
    AmountMismatch,
    DateMismatch,
    Duplicate,
    PossibleFraud,
}

impl DiscrepancyType {
    pub const ALL: [DiscrepancyType; 6] = [
        DiscrepancyType::MissingInLedger,
        DiscrepancyType::MissingInBank,
        DiscrepancyType::AmountMismatch,
        DiscrepancyType::DateMismatch,
        DiscrepancyType::Duplicate,
        DiscrepancyType::PossibleFraud,
    ];
}

impl fmt::Display for DiscrepancyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyType::MissingInLedger => write!(f, "missing_in_ledger"),
            DiscrepancyType::MissingInBank => write!(f, "missing_in_bank"),
            DiscrepancyType::AmountMismatch => write!(f, "amount_mismatch"),
            DiscrepancyType::DateMismatch => write!(f, "date_mismatch"),
            DiscrepancyType::Duplicate => write!(f, "duplicate"),
            DiscrepancyType::PossibleFraud => write!(f, "possible_fraud"),
        }
    }
}

/// Ordinal urgency, `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A detected anomaly surfaced for review.
///
/// `discrepancy_type`, `severity` and `machine_reason` are fixed at detection
/// time. Narrative collaborators may only fill in `explanation` and
/// `suggested_action` through [`Discrepancy::enrich`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub transaction_id: String,
    pub source: TransactionSource,
    pub discrepancy_type: DiscrepancyType,
    pub severity: Severity,
    pub machine_reason: String,
    pub related_transaction_id: Option<String>,

    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,

    pub expected_amount: Option<Money>,
    pub actual_amount: Option<Money>,
    pub amount_difference: Option<Money>,

    pub expected_date: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    pub date_difference_days: Option<i64>,

    /// Confidence in the detection itself; rule-based detections are certain.
    pub confidence: f64,
    pub suggested_action: Option<String>,
    pub explanation: Option<String>,
}

impl Discrepancy {
    /// Discrepancy about `tx`, carrying its amount, date and description.
    pub fn for_transaction(
        tx: &Transaction,
        discrepancy_type: DiscrepancyType,
        severity: Severity,
        machine_reason: String,
    ) -> Self {
        Self {
            transaction_id: tx.id.clone(),
            source: tx.source,
            discrepancy_type,
            severity,
            machine_reason,
            related_transaction_id: None,
            amount: Some(tx.amount),
            date: Some(tx.date),
            description: Some(tx.description.clone()),
            expected_amount: None,
            actual_amount: None,
            amount_difference: None,
            expected_date: None,
            actual_date: None,
            date_difference_days: None,
            confidence: 1.0,
            suggested_action: None,
            explanation: None,
        }
    }

    pub fn related_to(mut self, transaction_id: impl Into<String>) -> Self {
        self.related_transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_suggested_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = Some(action.into());
        self
    }

    /// Attach a narrative explanation and, optionally, a replacement action.
    pub fn enrich(&mut self, explanation: impl Into<String>, suggested_action: Option<String>) {
        self.explanation = Some(explanation.into());
        if let Some(action) = suggested_action {
            self.suggested_action = Some(action);
        }
    }
}

/// Discrepancies of one run plus tallies derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyResult {
    pub discrepancies: Vec<Discrepancy>,
    pub counts_by_type: BTreeMap<DiscrepancyType, usize>,
    pub counts_by_severity: BTreeMap<Severity, usize>,
}

impl DiscrepancyResult {
    /// Tallies every type and severity in one pass; absent kinds count 0.
    pub fn from_discrepancies(discrepancies: Vec<Discrepancy>) -> Self {
        let mut counts_by_type: BTreeMap<DiscrepancyType, usize> =
            DiscrepancyType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut counts_by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();

        for d in &discrepancies {
            *counts_by_type.entry(d.discrepancy_type).or_default() += 1;
            *counts_by_severity.entry(d.severity).or_default() += 1;
        }

        Self {
            discrepancies,
            counts_by_type,
            counts_by_severity,
        }
    }

    pub fn total(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn count_of_type(&self, discrepancy_type: DiscrepancyType) -> usize {
        self.counts_by_type
            .get(&discrepancy_type)
            .copied()
            .unwrap_or(0)
    }

    pub fn count_of_severity(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn of_type(&self, discrepancy_type: DiscrepancyType) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies
            .iter()
            .filter(move |d| d.discrepancy_type == discrepancy_type)
    }
}

impl Default for DiscrepancyResult {
    fn default() -> Self {
        Self::from_discrepancies(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concilio_core::TransactionType;

    fn sample_tx() -> Transaction {
        Transaction::new(
            "b1",
            TransactionSource::Bank,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Money::from_cents(10_000),
            TransactionType::Debit,
            "STARBUCKS",
        )
        .unwrap()
    }

    fn disc(t: DiscrepancyType, s: Severity) -> Discrepancy {
        Discrepancy::for_transaction(&sample_tx(), t, s, "reason".to_string())
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn tallies_cover_every_kind() {
        let result = DiscrepancyResult::from_discrepancies(vec![
            disc(DiscrepancyType::MissingInLedger, Severity::Medium),
            disc(DiscrepancyType::MissingInLedger, Severity::High),
            disc(DiscrepancyType::Duplicate, Severity::Low),
        ]);
        assert_eq!(result.total(), 3);
        assert_eq!(result.count_of_type(DiscrepancyType::MissingInLedger), 2);
        assert_eq!(result.count_of_type(DiscrepancyType::PossibleFraud), 0);
        assert_eq!(result.count_of_severity(Severity::Medium), 1);
        assert_eq!(result.counts_by_type.len(), DiscrepancyType::ALL.len());
        assert_eq!(result.counts_by_severity.len(), Severity::ALL.len());
        assert_eq!(result.of_type(DiscrepancyType::Duplicate).count(), 1);
    }

    #[test]
    fn enrich_keeps_classification() {
        let mut d = disc(DiscrepancyType::AmountMismatch, Severity::High)
            .with_suggested_action("Investigate");
        d.enrich("Likely a card fee", None);
        assert_eq!(d.explanation.as_deref(), Some("Likely a card fee"));
        assert_eq!(d.suggested_action.as_deref(), Some("Investigate"));
        assert_eq!(d.discrepancy_type, DiscrepancyType::AmountMismatch);
        assert_eq!(d.severity, Severity::High);
        assert_eq!(d.machine_reason, "reason");

        d.enrich("Confirmed fee", Some("Book the fee".to_string()));
        assert_eq!(d.suggested_action.as_deref(), Some("Book the fee"));
    }

    #[test]
    fn serializes_as_plain_data() {
        let d = disc(DiscrepancyType::MissingInLedger, Severity::Critical).related_to("l9");
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["discrepancy_type"], "missing_in_ledger");
        assert_eq!(value["severity"], "critical");
        assert_eq!(value["source"], "bank");
        assert_eq!(value["amount"], "100.00");
        assert_eq!(value["date"], "2024-01-15");
        assert_eq!(value["related_transaction_id"], "l9");

        let result = DiscrepancyResult::from_discrepancies(vec![d]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["counts_by_type"]["missing_in_ledger"], 1);
        assert_eq!(value["counts_by_severity"]["critical"], 1);
        assert_eq!(value["counts_by_severity"]["low"], 0);
    }
}
