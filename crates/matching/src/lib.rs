//! `concilio-match`: pairs bank and ledger transactions.
//!
//! Rule scoring (amount, date, reference), pluggable description similarity,
//! confidence combination, and greedy one-to-one assignment.

pub mod engine;
pub mod model;
pub mod rules;
pub mod scorer;
pub mod similarity;

pub use engine::MatchingEngine;
pub use model::{ComponentScores, Match, MatchResult, MatchType};
pub use rules::{RuleScorer, RuleScores};
pub use scorer::ConfidenceScorer;
pub use similarity::{
    provider_for, CachedSimilarity, ExactSimilarity, LevenshteinSimilarity, SimilarityProvider,
    TokenOverlapSimilarity,
};
