//! CalculateGroupHandler - one priority vector from several evaluators.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ahp::{
    AggregationMethod, AhpError, ComparisonMatrix, EvaluatorMatrix, EvaluatorPriority,
    GroupAggregator, GroupPolicy, GroupPriorityResult, PriorityMethod,
};
use crate::domain::evaluation::EvaluatorSubmission;
use crate::domain::foundation::{DomainError, EvaluatorId};

use super::CalculateIndividualHandler;

/// Evaluator data to aggregate.
#[derive(Debug, Clone)]
pub enum GroupInput {
    /// Priority vectors already solved per evaluator.
    Priorities(Vec<EvaluatorPriority>),
    /// Raw submissions; only completed ones are aggregated.
    Submissions {
        elements: Vec<String>,
        submissions: Vec<EvaluatorSubmission>,
    },
}

/// Command to aggregate a group of evaluators.
#[derive(Debug, Clone)]
pub struct CalculateGroupCommand {
    pub input: GroupInput,
    pub aggregation: AggregationMethod,
    /// Method for solving submitted matrices; falls back to the configured default.
    pub method: Option<PriorityMethod>,
    pub fill_gaps: bool,
    pub policy: GroupPolicy,
}

/// Handler for group aggregation.
pub struct CalculateGroupHandler {
    individual: Arc<CalculateIndividualHandler>,
}

impl CalculateGroupHandler {
    pub fn new(individual: Arc<CalculateIndividualHandler>) -> Self {
        Self { individual }
    }

    pub fn handle(&self, cmd: CalculateGroupCommand) -> Result<GroupPriorityResult, DomainError> {
        let method = cmd.method.unwrap_or(self.individual.default_method());

        let result = match cmd.input {
            GroupInput::Priorities(priorities) => match cmd.aggregation {
                AggregationMethod::IndividualPriorities => {
                    GroupAggregator::aggregate_priorities(&priorities, &cmd.policy)?
                }
                AggregationMethod::IndividualJudgments => {
                    return Err(AhpError::invalid_parameter(
                        "aggregation",
                        "judgment aggregation needs evaluator submissions, not priorities",
                    )
                    .into())
                }
            },
            GroupInput::Submissions {
                elements,
                submissions,
            } => self.aggregate_submissions(
                &elements,
                &submissions,
                cmd.aggregation,
                method,
                cmd.fill_gaps,
                &cmd.policy,
            )?,
        };

        info!(
            aggregation = ?result.method,
            included = result.included_count,
            excluded = result.excluded_evaluator_ids.len(),
            pending = result.pending_evaluator_ids.len(),
            "group priorities calculated"
        );
        Ok(result)
    }

    fn aggregate_submissions(
        &self,
        elements: &[String],
        submissions: &[EvaluatorSubmission],
        aggregation: AggregationMethod,
        method: PriorityMethod,
        fill_gaps: bool,
        policy: &GroupPolicy,
    ) -> Result<GroupPriorityResult, DomainError> {
        let mut pending: Vec<EvaluatorId> = Vec::new();
        let mut matrices = Vec::with_capacity(submissions.len());
        for submission in submissions {
            if !submission.is_completed() {
                debug!(
                    evaluator_id = %submission.evaluator_id(),
                    status = ?submission.status(),
                    "skipping unfinished evaluation"
                );
                pending.push(submission.evaluator_id().clone());
                continue;
            }
            let judgments = submission.completed_judgments()?;
            matrices.push(EvaluatorMatrix {
                evaluator_id: submission.evaluator_id().clone(),
                matrix: ComparisonMatrix::from_judgment_set(elements, judgments)?,
            });
        }

        let mut result = match aggregation {
            AggregationMethod::IndividualPriorities => {
                let mut priorities = Vec::with_capacity(matrices.len());
                for entry in &matrices {
                    priorities.push(EvaluatorPriority {
                        evaluator_id: entry.evaluator_id.clone(),
                        result: self.individual.solve_matrix(&entry.matrix, method, fill_gaps)?,
                    });
                }
                GroupAggregator::aggregate_priorities(&priorities, policy)?
            }
            AggregationMethod::IndividualJudgments => GroupAggregator::aggregate_judgments(
                &self.individual.solver_for(fill_gaps),
                &matrices,
                method,
                policy,
            )?,
        };
        result.pending_evaluator_ids = pending;
        Ok(result)
    }
}
