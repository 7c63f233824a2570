//! HTTP DTOs (Data Transfer Objects) for analysis endpoints.
//!
//! Requests are converted into application commands here. Responses reuse
//! the serializable domain results so a client can feed one endpoint's
//! output into the next (individual results into the group endpoint).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    AlternativePriorities, CalculateGroupCommand, CalculateHierarchyCommand,
    CalculateIndividualCommand, CriteriaPriorities, DecisionInputs, GroupInput, MatrixInput,
    MonteCarloSimulationCommand, PriorityInput, SensitivityAnalysisCommand,
};
use crate::domain::ahp::{
    AggregationMethod, Alternative, Criterion, EvaluatorPriority, GroupPolicy, PairwiseJudgment,
    PriorityMethod,
};
use crate::domain::evaluation::{EvaluationStatus, EvaluatorSubmission};
use crate::domain::foundation::{DomainError, EvaluatorId, ProjectId};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to solve one comparison matrix.
///
/// Exactly one of `judgments` or `matrix` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateIndividualRequest {
    pub elements: Vec<String>,
    pub judgments: Option<Vec<PairwiseJudgment>>,
    /// Row-major grid aligned with `elements`; `null` marks an unanswered pair.
    pub matrix: Option<Vec<Vec<Option<f64>>>>,
    pub method: Option<PriorityMethod>,
    #[serde(default)]
    pub fill_gaps: bool,
}

impl CalculateIndividualRequest {
    pub fn into_command(self) -> Result<CalculateIndividualCommand, DomainError> {
        let matrix = match (self.judgments, self.matrix) {
            (Some(judgments), None) => MatrixInput::Judgments(judgments),
            (None, Some(rows)) => MatrixInput::Rows(rows),
            _ => {
                return Err(DomainError::validation(
                    "matrix",
                    "provide exactly one of judgments or matrix",
                ))
            }
        };
        Ok(CalculateIndividualCommand {
            elements: self.elements,
            matrix,
            method: self.method,
            fill_gaps: self.fill_gaps,
        })
    }
}

/// One evaluator's judgments and evaluation status.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    pub evaluator_id: EvaluatorId,
    pub status: EvaluationStatus,
    #[serde(default)]
    pub judgments: Vec<PairwiseJudgment>,
}

/// Request to aggregate evaluators.
///
/// `results` carries solved individual priorities (AIP only); `elements`
/// with `submissions` carries raw judgments (AIP or AIJ).
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateGroupRequest {
    #[serde(default)]
    pub aggregation: AggregationMethod,
    pub results: Option<Vec<EvaluatorPriority>>,
    pub elements: Option<Vec<String>>,
    pub submissions: Option<Vec<SubmissionRequest>>,
    pub method: Option<PriorityMethod>,
    #[serde(default)]
    pub fill_gaps: bool,
    /// Overrides the configured threshold for this request.
    pub consistency_threshold: Option<f64>,
    /// Disables the consistency gate.
    #[serde(default)]
    pub include_inconsistent: bool,
    #[serde(default)]
    pub evaluator_weights: HashMap<EvaluatorId, f64>,
}

impl CalculateGroupRequest {
    pub fn into_command(self, default_threshold: f64) -> Result<CalculateGroupCommand, DomainError> {
        let input = match (self.results, self.elements, self.submissions) {
            (Some(results), None, None) => GroupInput::Priorities(results),
            (None, Some(elements), Some(submissions)) => GroupInput::Submissions {
                elements,
                submissions: submissions
                    .into_iter()
                    .map(|s| EvaluatorSubmission::restore(s.evaluator_id, s.status, s.judgments))
                    .collect::<Result<_, _>>()?,
            },
            _ => {
                return Err(DomainError::validation(
                    "results",
                    "provide either results, or elements with submissions",
                ))
            }
        };

        let threshold = if self.include_inconsistent {
            None
        } else {
            Some(self.consistency_threshold.unwrap_or(default_threshold))
        };
        let policy = self
            .evaluator_weights
            .into_iter()
            .fold(GroupPolicy::with_threshold(threshold), |policy, (id, w)| {
                policy.with_evaluator_weight(id, w)
            });

        Ok(CalculateGroupCommand {
            input,
            aggregation: self.aggregation,
            method: self.method,
            fill_gaps: self.fill_gaps,
            policy,
        })
    }
}

/// Local priorities of one group: explicit weights or judgments to solve.
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityInputRequest {
    pub weights: Option<BTreeMap<String, f64>>,
    pub judgments: Option<Vec<PairwiseJudgment>>,
}

impl PriorityInputRequest {
    fn into_input(self, field: &str) -> Result<PriorityInput, DomainError> {
        match (self.weights, self.judgments) {
            (Some(weights), None) => Ok(PriorityInput::Weights(weights)),
            (None, Some(judgments)) => Ok(PriorityInput::Judgments(judgments)),
            _ => Err(DomainError::validation(
                field,
                "provide exactly one of weights or judgments",
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaPrioritiesRequest {
    /// `null` for the criteria directly under the goal.
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub input: PriorityInputRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlternativePrioritiesRequest {
    pub criterion_id: String,
    #[serde(flatten)]
    pub input: PriorityInputRequest,
}

/// Request to synthesize a full hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateHierarchyRequest {
    pub criteria: Vec<Criterion>,
    pub alternatives: Vec<Alternative>,
    pub criteria_priorities: Vec<CriteriaPrioritiesRequest>,
    pub alternative_priorities: Vec<AlternativePrioritiesRequest>,
    pub method: Option<PriorityMethod>,
    #[serde(default)]
    pub fill_gaps: bool,
}

impl CalculateHierarchyRequest {
    pub fn into_command(self) -> Result<CalculateHierarchyCommand, DomainError> {
        let criteria_priorities = self
            .criteria_priorities
            .into_iter()
            .map(|group| {
                Ok(CriteriaPriorities {
                    parent_id: group.parent_id,
                    input: group.input.into_input("criteria_priorities")?,
                })
            })
            .collect::<Result<_, DomainError>>()?;
        let alternative_priorities = self
            .alternative_priorities
            .into_iter()
            .map(|group| {
                Ok(AlternativePriorities {
                    criterion_id: group.criterion_id,
                    input: group.input.into_input("alternative_priorities")?,
                })
            })
            .collect::<Result<_, DomainError>>()?;

        Ok(CalculateHierarchyCommand {
            criteria: self.criteria,
            alternatives: self.alternatives,
            criteria_priorities,
            alternative_priorities,
            method: self.method,
            fill_gaps: self.fill_gaps,
        })
    }
}

/// Request to sweep criterion weights of a project.
#[derive(Debug, Clone, Deserialize)]
pub struct SensitivityAnalysisRequest {
    pub global_weights: BTreeMap<String, f64>,
    pub local_priorities: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub target_criteria: Vec<String>,
    pub variation_range: f64,
}

impl SensitivityAnalysisRequest {
    pub fn into_command(self, project_id: ProjectId) -> SensitivityAnalysisCommand {
        SensitivityAnalysisCommand {
            project_id,
            inputs: DecisionInputs {
                global_weights: self.global_weights,
                local_priorities: self.local_priorities,
            },
            target_criteria: self.target_criteria,
            variation_range: self.variation_range,
        }
    }
}

/// Request to run a Monte Carlo stability simulation.
#[derive(Debug, Clone, Deserialize)]
pub struct MonteCarloSimulationRequest {
    pub global_weights: BTreeMap<String, f64>,
    pub local_priorities: BTreeMap<String, BTreeMap<String, f64>>,
    pub n_simulations: Option<usize>,
    pub uncertainty_level: f64,
    pub seed: Option<u64>,
}

impl MonteCarloSimulationRequest {
    pub fn into_command(self, project_id: ProjectId) -> MonteCarloSimulationCommand {
        MonteCarloSimulationCommand {
            project_id,
            inputs: DecisionInputs {
                global_weights: self.global_weights,
                local_priorities: self.local_priorities,
            },
            n_simulations: self.n_simulations,
            uncertainty_level: self.uncertainty_level,
            seed: self.seed,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        let details = if err.details.is_empty() {
            None
        } else {
            let map: serde_json::Map<String, serde_json::Value> = err
                .details
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            Some(serde_json::Value::Object(map))
        };
        Self {
            code: err.code.to_string(),
            message: err.message,
            details,
        }
    }
}
