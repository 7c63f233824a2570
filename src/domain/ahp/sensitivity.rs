//! Sensitivity & Rank-Reversal Analyzer - one-at-a-time weight sweeps.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AhpError, DecisionModel};
use crate::domain::foundation::Fraction;

/// Samples per swept criterion unless configured otherwise.
pub const DEFAULT_SENSITIVITY_STEPS: usize = 200;

/// Weight at which the top alternative changes during a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankReversalPoint {
    /// First sampled weight at which `to_alternative_id` leads.
    pub weight: f64,
    pub from_alternative_id: String,
    pub to_alternative_id: String,
}

/// Sweep outcome for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub criterion_id: String,
    pub original_weight: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    pub samples: usize,
    pub rank_reversal_points: Vec<RankReversalPoint>,
    /// Share of samples whose top alternative matches the baseline.
    pub stability_index: f64,
    pub baseline_top_alternative: String,
    /// Reversal point nearest the original weight, if any.
    pub critical_weight: Option<f64>,
}

/// Sweeps criterion weights and records where the leader changes.
///
/// Deterministic: the same model, targets, range and step count always give
/// the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitivityAnalyzer {
    steps: usize,
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self {
            steps: DEFAULT_SENSITIVITY_STEPS,
        }
    }
}

impl SensitivityAnalyzer {
    /// Creates an analyzer with a custom sample count (at least 2).
    pub fn new(steps: usize) -> Result<Self, AhpError> {
        if steps < 2 {
            return Err(AhpError::invalid_parameter(
                "sensitivity_steps",
                "at least two samples are needed to sweep a range",
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Sweeps each target over `[w(1-r), w(1+r)]`, capped at 1.
    ///
    /// The weight removed from or added to the target is taken from the
    /// other criteria in proportion to their weights. An empty target list
    /// sweeps every criterion.
    ///
    /// # Errors
    /// `UnknownElement` if a target is not a criterion of the model.
    pub fn analyze(
        &self,
        model: &DecisionModel,
        targets: &[String],
        variation_range: Fraction,
    ) -> Result<Vec<SensitivityResult>, AhpError> {
        let indices: Vec<usize> = if targets.is_empty() {
            (0..model.criteria().len()).collect()
        } else {
            targets
                .iter()
                .map(|t| {
                    model
                        .criterion_index(t)
                        .ok_or_else(|| AhpError::UnknownElement { id: t.clone() })
                })
                .collect::<Result<_, _>>()?
        };

        let baseline_top = model.top_with(model.weights());
        let results: Vec<SensitivityResult> = indices
            .into_iter()
            .map(|idx| self.sweep(model, idx, baseline_top, variation_range.value()))
            .collect();

        info!(
            criteria = results.len(),
            steps = self.steps,
            variation_range = variation_range.value(),
            reversals = results.iter().map(|r| r.rank_reversal_points.len()).sum::<usize>(),
            "sensitivity analysis completed"
        );
        Ok(results)
    }

    fn sweep(
        &self,
        model: &DecisionModel,
        target: usize,
        baseline_top: usize,
        range: f64,
    ) -> SensitivityResult {
        let original = model.weights()[target];
        let min_weight = (original * (1.0 - range)).max(0.0);
        let max_weight = (original * (1.0 + range)).min(1.0);
        let alternatives = model.alternatives();

        let mut reversal_points = Vec::new();
        let mut differing = 0usize;
        let mut previous_top: Option<usize> = None;

        for step in 0..self.steps {
            let fraction = step as f64 / (self.steps - 1) as f64;
            let weight = min_weight + (max_weight - min_weight) * fraction;
            let weights = redistribute(model.weights(), target, weight);
            let top = model.top_with(&weights);

            if top != baseline_top {
                differing += 1;
            }
            if let Some(prev) = previous_top {
                if prev != top {
                    reversal_points.push(RankReversalPoint {
                        weight,
                        from_alternative_id: alternatives[prev].clone(),
                        to_alternative_id: alternatives[top].clone(),
                    });
                }
            }
            previous_top = Some(top);
        }

        let critical_weight = reversal_points
            .iter()
            .map(|p| p.weight)
            .min_by(|a, b| (a - original).abs().total_cmp(&(b - original).abs()));

        SensitivityResult {
            criterion_id: model.criteria()[target].clone(),
            original_weight: original,
            min_weight,
            max_weight,
            samples: self.steps,
            rank_reversal_points: reversal_points,
            stability_index: 1.0 - differing as f64 / self.steps as f64,
            baseline_top_alternative: alternatives[baseline_top].clone(),
            critical_weight,
        }
    }
}

/// Sets `weights[target]` to `value` and rescales the rest to keep the sum at 1.
///
/// If the other criteria carry no weight, the remainder is split equally.
fn redistribute(weights: &[f64], target: usize, value: f64) -> Vec<f64> {
    let others = weights.len().saturating_sub(1);
    let remaining = 1.0 - weights[target];
    let freed = (1.0 - value).max(0.0);

    weights
        .iter()
        .enumerate()
        .map(|(idx, w)| {
            if idx == target {
                value
            } else if remaining > f64::EPSILON {
                w * freed / remaining
            } else {
                freed / others as f64
            }
        })
        .collect()
}
