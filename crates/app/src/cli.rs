//! CLI argument definitions using clap

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use concilio::read_config;
use concilio_core::{ReconConfig, SimilarityKind};

/// Concilio - Reconcile a bank statement against a ledger
#[derive(Debug, Parser)]
#[command(name = "concilio")]
#[command(about = "Match bank and ledger transactions and report discrepancies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON array of bank statement transactions
    #[arg(long)]
    pub bank: PathBuf,

    /// JSON array of ledger transactions
    #[arg(long)]
    pub ledger: PathBuf,

    /// TOML configuration (defaults apply for anything not set)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum confidence for a pair to be accepted (0.0 - 1.0)
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Description similarity backend: exact, levenshtein, token-overlap
    #[arg(long)]
    pub similarity: Option<SimilarityKind>,

    /// Reference date for the future-date check (YYYY-MM-DD, default today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Config file (or defaults), then command-line overrides on top.
    /// Validation of the merged result happens when the reconciler is built.
    pub fn effective_config(&self) -> Result<ReconConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ReconConfig::default(),
        };
        if let Some(min_confidence) = self.min_confidence {
            config.min_confidence = min_confidence;
        }
        if let Some(similarity) = self.similarity {
            config.similarity = similarity;
        }
        if let Some(as_of) = self.as_of {
            config.classifier.as_of = Some(as_of);
        }
        Ok(config)
    }
}
