use concilio_core::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which signal(s) carried a match, for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Semantic,
    Combined,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::Fuzzy => write!(f, "fuzzy"),
            MatchType::Semantic => write!(f, "semantic"),
            MatchType::Combined => write!(f, "combined"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub amount: f64,
    pub date: f64,
    pub description: f64,
    pub reference: f64,
}

/// A one-to-one correspondence between a left (bank) and a right (ledger)
/// transaction. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub left_id: String,
    pub right_id: String,
    pub confidence: f64,
    pub match_type: MatchType,
    pub amount_difference: Money,
    pub date_difference_days: i64,
    pub description_similarity: f64,
    pub reference_match: bool,
    pub scores: ComponentScores,
}

/// Output of one matching run: every input id is either in exactly one
/// match or in the unmatched list of its side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matches: Vec<Match>,
    pub unmatched_left: Vec<String>,
    pub unmatched_right: Vec<String>,
}

impl MatchResult {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn unmatched_left_count(&self) -> usize {
        self.unmatched_left.len()
    }

    pub fn unmatched_right_count(&self) -> usize {
        self.unmatched_right.len()
    }

    pub fn match_for_left(&self, left_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.left_id == left_id)
    }

    pub fn match_for_right(&self, right_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.right_id == right_id)
    }
}
