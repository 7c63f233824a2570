//! Group Aggregator - merges several evaluators into one priority vector.
//!
//! Two classical routes are supported:
//! - AIP (aggregation of individual priorities): weighted geometric mean of
//!   each evaluator's solved weights.
//! - AIJ (aggregation of individual judgments): weighted geometric mean of the
//!   matrices cell by cell, then one solve of the merged matrix.
//!
//! Both apply the same consistency gate before aggregating.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::priority_solver::normalize;
use super::{
    AhpError, ComparisonMatrix, PriorityMethod, PriorityResult, PrioritySolver,
    CONSISTENCY_THRESHOLD,
};
use crate::domain::foundation::EvaluatorId;

/// Which aggregation route produced a group result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Aggregation of individual priorities.
    #[default]
    #[serde(alias = "aip")]
    IndividualPriorities,
    /// Aggregation of individual judgments.
    #[serde(alias = "aij")]
    IndividualJudgments,
}

/// Inclusion rules for group aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPolicy {
    /// Evaluators whose CR exceeds this are left out. `None` disables the gate.
    pub consistency_threshold: Option<f64>,
    /// Relative evaluator influence; evaluators not listed weigh 1.
    pub evaluator_weights: HashMap<EvaluatorId, f64>,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            consistency_threshold: Some(CONSISTENCY_THRESHOLD),
            evaluator_weights: HashMap::new(),
        }
    }
}

impl GroupPolicy {
    /// Policy with a custom consistency gate.
    pub fn with_threshold(threshold: Option<f64>) -> Self {
        Self {
            consistency_threshold: threshold,
            ..Self::default()
        }
    }

    /// Adds an evaluator weight.
    pub fn with_evaluator_weight(mut self, evaluator_id: EvaluatorId, weight: f64) -> Self {
        self.evaluator_weights.insert(evaluator_id, weight);
        self
    }

    fn weight_of(&self, evaluator_id: &EvaluatorId) -> f64 {
        self.evaluator_weights.get(evaluator_id).copied().unwrap_or(1.0)
    }

    fn admits(&self, consistency_ratio: f64) -> bool {
        self.consistency_threshold
            .map_or(true, |threshold| consistency_ratio <= threshold)
    }

    fn validate(&self) -> Result<(), AhpError> {
        if let Some(threshold) = self.consistency_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(AhpError::invalid_parameter(
                    "consistency_threshold",
                    format!("must be a positive number, got {}", threshold),
                ));
            }
        }
        for (evaluator_id, weight) in &self.evaluator_weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(AhpError::invalid_parameter(
                    "evaluator_weights",
                    format!("weight for {} must be positive, got {}", evaluator_id, weight),
                ));
            }
        }
        Ok(())
    }

    fn threshold_for_error(&self) -> f64 {
        self.consistency_threshold.unwrap_or(f64::INFINITY)
    }
}

/// One evaluator's solved priorities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorPriority {
    pub evaluator_id: EvaluatorId,
    pub result: PriorityResult,
}

/// One evaluator's comparison matrix.
#[derive(Debug, Clone)]
pub struct EvaluatorMatrix {
    pub evaluator_id: EvaluatorId,
    pub matrix: ComparisonMatrix,
}

/// Consistency summary over the included evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateConsistency {
    pub mean_consistency_ratio: f64,
    pub max_consistency_ratio: f64,
    pub all_acceptable: bool,
}

/// Group weights with an audit trail of who was counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPriorityResult {
    pub element_ids: Vec<String>,
    pub weights: Vec<f64>,
    pub method: AggregationMethod,
    pub included_count: usize,
    pub included_evaluator_ids: Vec<EvaluatorId>,
    /// Evaluators left out by the consistency gate.
    pub excluded_evaluator_ids: Vec<EvaluatorId>,
    /// Evaluators whose session was not completed; filled by the caller.
    #[serde(default)]
    pub pending_evaluator_ids: Vec<EvaluatorId>,
    pub aggregate_consistency: AggregateConsistency,
    /// CR of the merged matrix (AIJ only).
    pub consistency_ratio: Option<f64>,
}

impl GroupPriorityResult {
    /// Returns the group weight of an element.
    pub fn weight_of(&self, id: &str) -> Option<f64> {
        self.element_ids
            .iter()
            .position(|e| e == id)
            .map(|idx| self.weights[idx])
    }
}

/// Applies the consistency gate and aggregates evaluators.
pub struct GroupAggregator;

impl GroupAggregator {
    /// Aggregates solved priority vectors (AIP).
    ///
    /// # Errors
    /// - `InsufficientConsistentData` if nobody passes the gate
    /// - `ElementMismatch` if evaluators compared different element sets
    /// - `InvalidParameter` for a bad policy or a repeated evaluator
    pub fn aggregate_priorities(
        individual: &[EvaluatorPriority],
        policy: &GroupPolicy,
    ) -> Result<GroupPriorityResult, AhpError> {
        policy.validate()?;
        ensure_unique(individual.iter().map(|e| &e.evaluator_id))?;

        let gate: Vec<(EvaluatorId, f64)> = individual
            .iter()
            .map(|e| (e.evaluator_id.clone(), e.result.consistency_ratio))
            .collect();
        let (included, excluded) = apply_gate(&gate, policy)?;

        let reference = &individual[included[0]].result.element_ids;
        let mut aligned = Vec::with_capacity(included.len());
        for &idx in &included {
            let entry = &individual[idx];
            let weights = align(reference, &entry.result.element_ids, &entry.result.weights)
                .ok_or_else(|| AhpError::ElementMismatch {
                    reason: format!(
                        "evaluator {} compared a different element set",
                        entry.evaluator_id
                    ),
                })?;
            aligned.push((policy.weight_of(&entry.evaluator_id), weights));
        }

        let mut weights = vec![0.0; reference.len()];
        let total: f64 = aligned.iter().map(|(alpha, _)| alpha).sum();
        for (e, weight) in weights.iter_mut().enumerate() {
            let log_mean = aligned
                .iter()
                .map(|(alpha, w)| alpha * w[e].ln())
                .sum::<f64>()
                / total;
            *weight = log_mean.exp();
        }
        normalize(&mut weights)?;

        debug!(
            included = included.len(),
            excluded = excluded.len(),
            elements = reference.len(),
            "aggregated individual priorities"
        );

        Ok(GroupPriorityResult {
            element_ids: reference.clone(),
            weights,
            method: AggregationMethod::IndividualPriorities,
            included_count: included.len(),
            included_evaluator_ids: included
                .iter()
                .map(|&i| individual[i].evaluator_id.clone())
                .collect(),
            excluded_evaluator_ids: excluded
                .iter()
                .map(|&i| individual[i].evaluator_id.clone())
                .collect(),
            pending_evaluator_ids: Vec::new(),
            aggregate_consistency: summarize(
                included.iter().map(|&i| individual[i].result.consistency_ratio),
                policy,
            ),
            consistency_ratio: None,
        })
    }

    /// Aggregates raw matrices cell by cell and solves the merged matrix (AIJ).
    ///
    /// Each evaluator is solved first so the consistency gate can run.
    /// Cells missing for some evaluators are merged from the rest.
    pub fn aggregate_judgments(
        solver: &PrioritySolver,
        matrices: &[EvaluatorMatrix],
        method: PriorityMethod,
        policy: &GroupPolicy,
    ) -> Result<GroupPriorityResult, AhpError> {
        policy.validate()?;
        ensure_unique(matrices.iter().map(|e| &e.evaluator_id))?;

        let mut gate = Vec::with_capacity(matrices.len());
        for entry in matrices {
            let result = solver.solve(&entry.matrix, method)?;
            gate.push((entry.evaluator_id.clone(), result.consistency_ratio));
        }
        let (included, excluded) = apply_gate(&gate, policy)?;

        let reference = matrices[included[0]].matrix.elements().to_vec();
        let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();
        let mut mapped = Vec::with_capacity(included.len());
        for &idx in &included {
            let entry = &matrices[idx];
            let elements = entry.matrix.elements();
            if elements.len() != reference.len()
                || !elements.iter().all(|e| reference_set.contains(e.as_str()))
            {
                return Err(AhpError::ElementMismatch {
                    reason: format!(
                        "evaluator {} compared a different element set",
                        entry.evaluator_id
                    ),
                });
            }
            let order: Vec<usize> = reference
                .iter()
                .filter_map(|id| entry.matrix.index_of(id))
                .collect();
            mapped.push((policy.weight_of(&entry.evaluator_id), &entry.matrix, order));
        }

        let merged = ComparisonMatrix::assemble(reference.clone(), |i, j| {
            let mut log_sum = 0.0;
            let mut total = 0.0;
            for (alpha, matrix, order) in &mapped {
                if let Some(value) = matrix.get(order[i], order[j]) {
                    log_sum += alpha * value.ln();
                    total += alpha;
                }
            }
            (total > 0.0).then(|| (log_sum / total).exp())
        });
        let solved = solver.solve(&merged, method)?;

        debug!(
            included = included.len(),
            excluded = excluded.len(),
            consistency_ratio = solved.consistency_ratio,
            "aggregated individual judgments"
        );

        Ok(GroupPriorityResult {
            element_ids: solved.element_ids,
            weights: solved.weights,
            method: AggregationMethod::IndividualJudgments,
            included_count: included.len(),
            included_evaluator_ids: included.iter().map(|&i| gate[i].0.clone()).collect(),
            excluded_evaluator_ids: excluded.iter().map(|&i| gate[i].0.clone()).collect(),
            pending_evaluator_ids: Vec::new(),
            aggregate_consistency: summarize(included.iter().map(|&i| gate[i].1), policy),
            consistency_ratio: Some(solved.consistency_ratio),
        })
    }
}

/// Splits evaluator indices into included and excluded.
fn apply_gate(
    gate: &[(EvaluatorId, f64)],
    policy: &GroupPolicy,
) -> Result<(Vec<usize>, Vec<usize>), AhpError> {
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for (idx, (evaluator_id, consistency_ratio)) in gate.iter().enumerate() {
        if policy.admits(*consistency_ratio) {
            included.push(idx);
        } else {
            warn!(
                evaluator_id = %evaluator_id,
                consistency_ratio,
                threshold = policy.threshold_for_error(),
                "evaluator excluded by consistency gate"
            );
            excluded.push(idx);
        }
    }
    if included.is_empty() {
        return Err(AhpError::InsufficientConsistentData {
            excluded: excluded.len(),
            threshold: policy.threshold_for_error(),
        });
    }
    Ok((included, excluded))
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a EvaluatorId>) -> Result<(), AhpError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AhpError::invalid_parameter(
                "evaluators",
                format!("evaluator {} appears more than once", id),
            ));
        }
    }
    Ok(())
}

/// Reorders `weights` (indexed by `ids`) into `reference` order.
fn align(reference: &[String], ids: &[String], weights: &[f64]) -> Option<Vec<f64>> {
    if ids.len() != reference.len() || weights.len() != ids.len() {
        return None;
    }
    reference
        .iter()
        .map(|r| ids.iter().position(|id| id == r).map(|idx| weights[idx]))
        .collect()
}

fn summarize(ratios: impl Iterator<Item = f64>, policy: &GroupPolicy) -> AggregateConsistency {
    let ratios: Vec<f64> = ratios.collect();
    let count = ratios.len().max(1) as f64;
    let max_consistency_ratio = ratios.iter().copied().fold(0.0, f64::max);
    let threshold = policy.consistency_threshold.unwrap_or(CONSISTENCY_THRESHOLD);
    AggregateConsistency {
        mean_consistency_ratio: ratios.iter().sum::<f64>() / count,
        max_consistency_ratio,
        all_acceptable: max_consistency_ratio <= threshold,
    }
}
