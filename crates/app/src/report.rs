use concilio_detect::DiscrepancyResult;
use concilio_match::MatchResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bank_count: usize,
    pub ledger_count: usize,
    pub matched_count: usize,
    pub unmatched_bank_count: usize,
    pub unmatched_ledger_count: usize,
    pub discrepancy_count: usize,
    /// Matched pairs over the larger side; 0 when both sides are empty.
    pub match_rate: f64,
}

impl RunSummary {
    pub fn new(
        bank_count: usize,
        ledger_count: usize,
        matches: &MatchResult,
        discrepancies: &DiscrepancyResult,
    ) -> Self {
        let larger = bank_count.max(ledger_count);
        let match_rate = if larger == 0 {
            0.0
        } else {
            matches.match_count() as f64 / larger as f64
        };

        Self {
            bank_count,
            ledger_count,
            matched_count: matches.match_count(),
            unmatched_bank_count: matches.unmatched_left_count(),
            unmatched_ledger_count: matches.unmatched_right_count(),
            discrepancy_count: discrepancies.total(),
            match_rate,
        }
    }
}

/// Everything one run produced, as plain serializable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub summary: RunSummary,
    pub matches: MatchResult,
    pub discrepancies: DiscrepancyResult,
}
