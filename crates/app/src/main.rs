//! Concilio CLI - bank statement to ledger reconciliation
//!
//! Usage:
//!   concilio --bank bank.json --ledger ledger.json
//!   concilio --bank bank.json --ledger ledger.json --config recon.toml --pretty

mod cli;


use anyhow::{Context, Result};
use clap::Parser;
use concilio::{read_transactions, Reconciler};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries the report
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let json = run(&cli)?;
    println!("{json}");

    Ok(())
}

/// Loads both sides, reconciles them and renders the report as JSON.
fn run(cli: &Cli) -> Result<String> {
    let config = cli.effective_config()?;
    let reconciler = Reconciler::from_config(config).context("Invalid configuration")?;

    let bank = read_transactions(&cli.bank)?;
    let ledger = read_transactions(&cli.ledger)?;

    let report = reconciler.run(&bank, &ledger);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize report")?;

    Ok(json)
}
