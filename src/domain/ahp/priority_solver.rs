//! Priority Vector Solver - normalized weights from a comparison matrix.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::consistency::{ConsistencyChecker, ConsistencyReport};
use super::{AhpError, ComparisonMatrix};

/// Absolute tolerance for the sum-to-one invariant.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Default convergence bound for power iteration.
pub const DEFAULT_EIGEN_TOLERANCE: f64 = 1e-10;

/// Default iteration cap for power iteration.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// How the caller wants priorities derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityMethod {
    /// Row geometric means, normalized. Closed form, always available.
    #[default]
    GeometricMean,
    /// Principal eigenvector by power iteration (classical Saaty AHP).
    Eigenvector,
}

/// How the returned priorities were actually derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationMethod {
    GeometricMean,
    Eigenvector,
    /// Eigenvector was requested but power iteration hit its cap.
    GeometricMeanFallback,
}

/// What to do with a matrix that has unanswered pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Refuse with `IncompleteMatrix`.
    #[default]
    Reject,
    /// Estimate gaps transitively before solving.
    TransitiveEstimate,
}

/// Power-iteration and gap-handling settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub gap_policy: GapPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_EIGEN_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            gap_policy: GapPolicy::Reject,
        }
    }
}

/// Priority weights for one comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityResult {
    /// Element ids in matrix order.
    pub element_ids: Vec<String>,
    /// Weights aligned with `element_ids`; positive and summing to 1.
    pub weights: Vec<f64>,
    pub consistency_ratio: f64,
    pub consistency: ConsistencyReport,
    pub method: DerivationMethod,
    /// Power-iteration steps, when the eigenvector method converged.
    pub iterations: Option<usize>,
    /// Pairs that were estimated rather than judged.
    pub estimated_pairs: usize,
}

impl PriorityResult {
    /// Returns the weight of an element.
    pub fn weight_of(&self, id: &str) -> Option<f64> {
        self.element_ids
            .iter()
            .position(|e| e == id)
            .map(|idx| self.weights[idx])
    }

    /// Returns true if the consistency ratio is within the threshold used.
    pub fn is_consistent(&self) -> bool {
        self.consistency.acceptable
    }

    /// Elements ordered by descending weight, ties by ascending id.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut pairs: Vec<(&str, f64)> = self
            .element_ids
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        pairs
    }
}

/// Derives priority vectors and their consistency.
#[derive(Debug, Clone, Default)]
pub struct PrioritySolver {
    config: SolverConfig,
    checker: ConsistencyChecker,
}

impl PrioritySolver {
    /// Creates a solver with explicit settings.
    pub fn new(config: SolverConfig, checker: ConsistencyChecker) -> Self {
        Self { config, checker }
    }

    /// Returns the solver settings.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Returns the consistency checker.
    pub fn checker(&self) -> &ConsistencyChecker {
        &self.checker
    }

    /// Returns the same solver with a different gap policy.
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.config.gap_policy = gap_policy;
        self
    }

    /// Solves a matrix.
    ///
    /// # Errors
    /// - `IncompleteMatrix` if gaps exist and the policy is `Reject`, or if
    ///   transitive estimation cannot reach every pair
    /// - `DegenerateMatrix` if the entries cannot produce a positive vector
    pub fn solve(
        &self,
        matrix: &ComparisonMatrix,
        method: PriorityMethod,
    ) -> Result<PriorityResult, AhpError> {
        let filled;
        let matrix = if matrix.is_complete() {
            matrix
        } else {
            match self.config.gap_policy {
                GapPolicy::Reject => {
                    return Err(AhpError::IncompleteMatrix {
                        missing_pairs: matrix.missing_pairs(),
                    })
                }
                GapPolicy::TransitiveEstimate => {
                    filled = matrix.fill_gaps()?;
                    &filled
                }
            }
        };

        let n = matrix.size();
        ensure_positive_entries(matrix)?;

        if n <= 2 {
            let weights = geometric_mean_weights(matrix)?;
            let applied = match method {
                PriorityMethod::GeometricMean => DerivationMethod::GeometricMean,
                PriorityMethod::Eigenvector => DerivationMethod::Eigenvector,
            };
            let consistency = self.checker.perfectly_consistent(n);
            return Ok(self.finish(matrix, weights, consistency, applied, None));
        }

        let (weights, applied, iterations) = match method {
            PriorityMethod::GeometricMean => {
                (geometric_mean_weights(matrix)?, DerivationMethod::GeometricMean, None)
            }
            PriorityMethod::Eigenvector => match self.power_iteration(matrix)? {
                Some((weights, iterations)) => {
                    debug!(n, iterations, "eigenvector converged");
                    (weights, DerivationMethod::Eigenvector, Some(iterations))
                }
                None => {
                    warn!(
                        n,
                        max_iterations = self.config.max_iterations,
                        "eigenvector did not converge, falling back to geometric mean"
                    );
                    (
                        geometric_mean_weights(matrix)?,
                        DerivationMethod::GeometricMeanFallback,
                        None,
                    )
                }
            },
        };

        let lambda_max = estimate_lambda_max(matrix, &weights);
        let consistency = self.checker.check(n, lambda_max);
        Ok(self.finish(matrix, weights, consistency, applied, iterations))
    }

    fn finish(
        &self,
        matrix: &ComparisonMatrix,
        weights: Vec<f64>,
        consistency: ConsistencyReport,
        method: DerivationMethod,
        iterations: Option<usize>,
    ) -> PriorityResult {
        PriorityResult {
            element_ids: matrix.elements().to_vec(),
            weights,
            consistency_ratio: consistency.consistency_ratio,
            consistency,
            method,
            iterations,
            estimated_pairs: matrix.estimated_pairs(),
        }
    }

    /// Iterates `v <- M v / sum(M v)` from the uniform vector.
    ///
    /// Returns `Ok(None)` when the iteration cap is reached first.
    fn power_iteration(
        &self,
        matrix: &ComparisonMatrix,
    ) -> Result<Option<(Vec<f64>, usize)>, AhpError> {
        let n = matrix.size();
        let mut current = vec![1.0 / n as f64; n];

        for iteration in 1..=self.config.max_iterations {
            let mut next = multiply(matrix, &current);
            let sum: f64 = next.iter().sum();
            if !sum.is_finite() || sum <= 0.0 {
                return Err(AhpError::degenerate("power iteration produced a non-positive vector"));
            }
            next.iter_mut().for_each(|x| *x /= sum);

            let delta = next
                .iter()
                .zip(&current)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            current = next;

            if delta < self.config.tolerance {
                return Ok(Some((current, iteration)));
            }
        }

        Ok(None)
    }
}

/// Normalized row geometric means, computed in log space.
pub(crate) fn geometric_mean_weights(matrix: &ComparisonMatrix) -> Result<Vec<f64>, AhpError> {
    let n = matrix.size();
    let mut weights: Vec<f64> = (0..n)
        .map(|i| {
            let log_mean = matrix.row(i).iter().map(|x| x.ln()).sum::<f64>() / n as f64;
            log_mean.exp()
        })
        .collect();
    normalize(&mut weights)?;
    Ok(weights)
}

/// `λmax ≈ mean_i((M w)_i / w_i)`.
pub(crate) fn estimate_lambda_max(matrix: &ComparisonMatrix, weights: &[f64]) -> f64 {
    let product = multiply(matrix, weights);
    let n = weights.len() as f64;
    product
        .iter()
        .zip(weights)
        .map(|(mw, w)| mw / w)
        .sum::<f64>()
        / n
}

/// Scales a positive vector to sum to one.
pub(crate) fn normalize(weights: &mut [f64]) -> Result<(), AhpError> {
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 || weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(AhpError::degenerate("weights must be finite and positive"));
    }
    weights.iter_mut().for_each(|w| *w /= sum);
    Ok(())
}

fn multiply(matrix: &ComparisonMatrix, vector: &[f64]) -> Vec<f64> {
    (0..matrix.size())
        .map(|i| matrix.row(i).iter().zip(vector).map(|(a, b)| a * b).sum())
        .collect()
}

fn ensure_positive_entries(matrix: &ComparisonMatrix) -> Result<(), AhpError> {
    for i in 0..matrix.size() {
        if matrix.row(i).iter().any(|x| !x.is_finite() || *x <= 0.0) {
            return Err(AhpError::degenerate(format!(
                "row {} of the comparison matrix has a non-positive entry",
                matrix.elements()[i]
            )));
        }
    }
    Ok(())
}
