use std::path::{Path, PathBuf};

use concilio_core::{ConfigError, ReconConfig, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid transactions in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Parses a JSON array of transactions. Every element is validated on the way
/// in; one bad record fails the whole document.
pub fn parse_transactions(json: &str) -> Result<Vec<Transaction>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn read_transactions(path: &Path) -> Result<Vec<Transaction>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let transactions = parse_transactions(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), count = transactions.len(), "Loaded transactions");
    Ok(transactions)
}

pub fn read_config(path: &Path) -> Result<ReconConfig, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ReconConfig::from_toml(&content).map_err(|source| LoadError::Config {
        path: path.to_path_buf(),
        source,
    })
}
