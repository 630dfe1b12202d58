use std::collections::HashSet;

use concilio_core::{ConfigError, MatchingConfig, ScoringWeights, Transaction};

use crate::model::{ComponentScores, Match, MatchResult};
use crate::rules::{RuleScorer, RuleScores};
use crate::scorer::ConfidenceScorer;
use crate::similarity::{ExactSimilarity, SimilarityProvider};

/// Greedy one-to-one matcher.
///
/// For each left transaction in input order, every still-unmatched right
/// transaction is scored and the highest-confidence viable candidate wins.
/// Ties keep the first-seen right transaction. This is not a global optimum
/// assignment: an earlier left transaction can take a right transaction that
/// a later one needed.
pub struct MatchingEngine<S: SimilarityProvider = ExactSimilarity> {
    rules: RuleScorer,
    scorer: ConfidenceScorer,
    similarity: S,
}

struct Candidate<'a> {
    right: &'a Transaction,
    rule: RuleScores,
    description_score: f64,
    confidence: f64,
}

impl Default for MatchingEngine<ExactSimilarity> {
    fn default() -> Self {
        Self {
            rules: RuleScorer::new(MatchingConfig::default()),
            scorer: ConfidenceScorer::default(),
            similarity: ExactSimilarity,
        }
    }
}

impl<S: SimilarityProvider> MatchingEngine<S> {
    pub fn new(
        config: MatchingConfig,
        weights: ScoringWeights,
        similarity: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let scorer = ConfidenceScorer::new(weights, config.reference_match_bonus)?;
        Ok(Self {
            rules: RuleScorer::new(config),
            scorer,
            similarity,
        })
    }

    pub fn rules(&self) -> &RuleScorer {
        &self.rules
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    pub fn find_matches(
        &self,
        left: &[Transaction],
        right: &[Transaction],
        min_confidence: f64,
    ) -> MatchResult {
        tracing::info!(
            left = left.len(),
            right = right.len(),
            min_confidence,
            "Matching transactions"
        );

        let mut matches = Vec::new();
        let mut matched_left: HashSet<&str> = HashSet::new();
        let mut matched_right: HashSet<&str> = HashSet::new();

        for l in left {
            if matched_left.contains(l.id.as_str()) {
                continue;
            }

            let Some(best) = self.best_candidate(l, right, &matched_right, min_confidence) else {
                continue;
            };

            let m = self.build_match(l, &best);
            tracing::debug!(
                left_id = %m.left_id,
                right_id = %m.right_id,
                confidence = m.confidence,
                match_type = %m.match_type,
                "Matched"
            );

            matched_left.insert(l.id.as_str());
            matched_right.insert(best.right.id.as_str());
            matches.push(m);
        }

        let unmatched_left: Vec<String> = left
            .iter()
            .filter(|tx| !matched_left.contains(tx.id.as_str()))
            .map(|tx| tx.id.clone())
            .collect();
        let unmatched_right: Vec<String> = right
            .iter()
            .filter(|tx| !matched_right.contains(tx.id.as_str()))
            .map(|tx| tx.id.clone())
            .collect();

        tracing::info!(
            matched = matches.len(),
            unmatched_left = unmatched_left.len(),
            unmatched_right = unmatched_right.len(),
            "Matching complete"
        );

        MatchResult {
            matches,
            unmatched_left,
            unmatched_right,
        }
    }

    fn best_candidate<'a>(
        &self,
        left: &Transaction,
        right: &'a [Transaction],
        matched_right: &HashSet<&str>,
        min_confidence: f64,
    ) -> Option<Candidate<'a>> {
        let mut best: Option<Candidate<'a>> = None;

        for r in right {
            if matched_right.contains(r.id.as_str()) {
                continue;
            }
            let Some(candidate) = self.score_pair(left, r) else {
                continue;
            };
            // Zero confidence never matches; a NaN threshold accepts nothing.
            if !(candidate.confidence > 0.0 && candidate.confidence >= min_confidence) {
                continue;
            }
            // Strictly greater: the first-seen candidate keeps a tie.
            if best
                .as_ref()
                .map_or(true, |b| candidate.confidence > b.confidence)
            {
                best = Some(candidate);
            }
        }

        best
    }

    fn score_pair<'a>(&self, left: &Transaction, right: &'a Transaction) -> Option<Candidate<'a>> {
        let rule = self.rules.evaluate(left, right)?;
        let description_score = self
            .similarity
            .similarity(&left.normalized_description, &right.normalized_description)
            .clamp(0.0, 1.0);
        let confidence = self.scorer.calculate_confidence(
            rule.amount_score,
            rule.date_score,
            description_score,
            rule.reference_match,
        );

        Some(Candidate {
            right,
            rule,
            description_score,
            confidence,
        })
    }

    fn build_match(&self, left: &Transaction, c: &Candidate<'_>) -> Match {
        let match_type = self.scorer.determine_match_type(
            c.rule.amount_score,
            c.rule.date_score,
            c.description_score,
        );

        Match {
            left_id: left.id.clone(),
            right_id: c.right.id.clone(),
            confidence: c.confidence,
            match_type,
            amount_difference: c.rule.amount_difference,
            date_difference_days: c.rule.date_difference_days,
            description_similarity: c.description_score,
            reference_match: c.rule.reference_match,
            scores: ComponentScores {
                amount: c.rule.amount_score,
                date: c.rule.date_score,
                description: c.description_score,
                reference: if c.rule.reference_match { 1.0 } else { 0.0 },
            },
        }
    }
}
