pub mod config;
pub mod money;
pub mod text;
pub mod transaction;

pub use config::{
    ClassifierConfig, ConfigError, MatchingConfig, ReconConfig, ScoringWeights, SimilarityKind,
};
pub use money::Money;
pub use text::{levenshtein_distance, normalize_description};
pub use transaction::{
    Transaction, TransactionError, TransactionRecord, TransactionSource, TransactionType,
};
