use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Money;
use super::text::normalize_description;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Bank,
    Ledger,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionSource::Bank => write!(f, "bank"),
            TransactionSource::Ledger => write!(f, "ledger"),
        }
    }
}

impl TransactionSource {
    /// Human label used in machine reasons ("Bank", "Ledger").
    pub fn label(self) -> &'static str {
        match self {
            TransactionSource::Bank => "Bank",
            TransactionSource::Ledger => "Ledger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Credit => write!(f, "credit"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionError {
    #[error("Transaction id must not be empty")]
    EmptyId,
    #[error("Transaction {id}: amount must be positive, got {amount}")]
    NonPositiveAmount { id: String, amount: Money },
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A normalized record as handed over by ingestion, before invariants are checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub source: TransactionSource,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Immutable, validated transaction. `amount` is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    pub id: String,
    pub source: TransactionSource,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub normalized_description: String,
    pub reference: Option<String>,
    pub currency: String,
}

impl Transaction {
    pub fn validate(record: TransactionRecord) -> Result<Transaction, TransactionError> {
        if record.id.trim().is_empty() {
            return Err(TransactionError::EmptyId);
        }
        if !record.amount.is_positive() {
            return Err(TransactionError::NonPositiveAmount {
                id: record.id,
                amount: record.amount,
            });
        }

        let normalized_description = normalize_description(&record.description);
        let reference = record
            .reference
            .filter(|r| !r.trim().is_empty());

        Ok(Transaction {
            id: record.id,
            source: record.source,
            date: record.date,
            amount: record.amount,
            transaction_type: record.transaction_type,
            description: record.description,
            normalized_description,
            reference,
            currency: record.currency,
        })
    }

    /// Convenience constructor for a record without reference in the default currency.
    pub fn new(
        id: impl Into<String>,
        source: TransactionSource,
        date: NaiveDate,
        amount: Money,
        transaction_type: TransactionType,
        description: impl Into<String>,
    ) -> Result<Transaction, TransactionError> {
        Transaction::validate(TransactionRecord {
            id: id.into(),
            source,
            date,
            amount,
            transaction_type,
            description: description.into(),
            reference: None,
            currency: default_currency(),
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        self.reference = (!reference.trim().is_empty()).then_some(reference);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = TransactionError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        Transaction::validate(record)
    }
}
