//! Decision Model - leaf weights and alternative priorities ready for scoring.
//!
//! Shared by the hierarchical aggregator, the sensitivity analyzer and the
//! Monte Carlo simulator so all three rank alternatives the same way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::priority_solver::SUM_TOLERANCE;
use super::AhpError;

/// Final score of one alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalScore {
    pub alternative_id: String,
    pub score: f64,
    /// 1-based. Tied scores still get distinct ranks, smaller id first.
    pub rank: usize,
}

/// Validated global criterion weights and local alternative priorities.
///
/// Criteria and alternatives are held in ascending id order so that every
/// derived ranking is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionModel {
    criteria: Vec<String>,
    weights: Vec<f64>,
    alternatives: Vec<String>,
    /// `priorities[c][a]` is the local priority of alternative `a` under criterion `c`.
    priorities: Vec<Vec<f64>>,
}

impl DecisionModel {
    /// Builds a model from global weights (keyed by criterion) and local
    /// priorities (keyed by criterion, then alternative).
    ///
    /// Weights are renormalized to sum to 1.
    ///
    /// # Errors
    /// - `DegenerateMatrix` for empty, negative, non-finite, or all-zero weights
    /// - `MissingPriorities` if a weighted criterion has no local priorities
    /// - `UnknownElement` for priorities under an unweighted criterion
    /// - `ElementMismatch` if criteria disagree on the alternative set
    pub fn new(
        global_weights: &BTreeMap<String, f64>,
        local_priorities: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Result<Self, AhpError> {
        if global_weights.is_empty() {
            return Err(AhpError::degenerate("at least one criterion weight is required"));
        }
        let criteria: Vec<String> = global_weights.keys().cloned().collect();
        let mut weights: Vec<f64> = global_weights.values().copied().collect();
        normalize_non_negative(&mut weights, "criterion weights")?;

        if let Some(extra) = local_priorities.keys().find(|c| !global_weights.contains_key(*c)) {
            return Err(AhpError::UnknownElement { id: extra.clone() });
        }

        let first = local_priorities
            .get(&criteria[0])
            .ok_or_else(|| AhpError::MissingPriorities {
                node: criteria[0].clone(),
            })?;
        let alternatives: Vec<String> = first.keys().cloned().collect();
        if alternatives.is_empty() {
            return Err(AhpError::degenerate("at least one alternative is required"));
        }

        let mut priorities = Vec::with_capacity(criteria.len());
        for criterion in &criteria {
            let local = local_priorities
                .get(criterion)
                .ok_or_else(|| AhpError::MissingPriorities {
                    node: criterion.clone(),
                })?;
            if local.len() != alternatives.len()
                || !alternatives.iter().all(|a| local.contains_key(a))
            {
                return Err(AhpError::ElementMismatch {
                    reason: format!(
                        "criterion {} does not score the same alternatives as {}",
                        criterion, criteria[0]
                    ),
                });
            }
            let row: Vec<f64> = alternatives.iter().map(|a| local[a]).collect();
            if row.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(AhpError::degenerate(format!(
                    "local priorities under {} must be finite and non-negative",
                    criterion
                )));
            }
            priorities.push(row);
        }

        Ok(Self {
            criteria,
            weights,
            alternatives,
            priorities,
        })
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Index of a criterion in [`DecisionModel::criteria`].
    pub fn criterion_index(&self, id: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c == id)
    }

    /// Weighted sum per alternative for an arbitrary weight vector.
    pub fn scores_with(&self, weights: &[f64]) -> Vec<f64> {
        let mut scores = vec![0.0; self.alternatives.len()];
        for (row, weight) in self.priorities.iter().zip(weights) {
            for (score, priority) in scores.iter_mut().zip(row) {
                *score += weight * priority;
            }
        }
        scores
    }

    /// Index of the top alternative under `weights`.
    pub fn top_with(&self, weights: &[f64]) -> usize {
        top_index(&self.scores_with(weights))
    }

    /// Id of the top alternative under the model's own weights.
    pub fn baseline_top(&self) -> &str {
        &self.alternatives[self.top_with(&self.weights)]
    }

    /// Ranked scores under the model's own weights.
    pub fn baseline_ranking(&self) -> Vec<GlobalScore> {
        rank_scores(&self.alternatives, &self.scores_with(&self.weights))
    }
}

/// Index of the largest score; on ties the earliest index wins.
///
/// With ids in ascending order this is the lexicographically smaller id.
pub(crate) fn top_index(scores: &[f64]) -> usize {
    let mut best = 0;
    for (idx, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = idx;
        }
    }
    best
}

/// Sorts alternatives by descending score, ties by ascending id, and assigns ranks.
pub(crate) fn rank_scores(ids: &[String], scores: &[f64]) -> Vec<GlobalScore> {
    let mut ranked: Vec<GlobalScore> = ids
        .iter()
        .zip(scores)
        .map(|(id, score)| GlobalScore {
            alternative_id: id.clone(),
            score: *score,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.alternative_id.cmp(&b.alternative_id))
    });
    for (idx, entry) in ranked.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }
    ranked
}

/// Scales non-negative values with a positive sum to sum to 1.
pub(crate) fn normalize_non_negative(values: &mut [f64], what: &str) -> Result<(), AhpError> {
    let sum: f64 = values.iter().sum();
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) || !sum.is_finite() || sum <= 0.0 {
        return Err(AhpError::degenerate(format!(
            "{} must be finite, non-negative and not all zero",
            what
        )));
    }
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        values.iter_mut().for_each(|v| *v /= sum);
    }
    Ok(())
}
