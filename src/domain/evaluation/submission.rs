//! Evaluator submission - one evaluator's judgments and survey status.

use crate::domain::ahp::{JudgmentSet, PairwiseJudgment};
use crate::domain::foundation::{DomainError, ErrorCode, EvaluatorId, StateMachine};

use super::EvaluationStatus;

/// Judgments collected from one evaluator, gated by the survey status.
///
/// The engine only reads judgments from a completed submission. Pausing,
/// resuming and auto-saving happen outside the engine and only move this
/// status along.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorSubmission {
    evaluator_id: EvaluatorId,
    status: EvaluationStatus,
    judgments: JudgmentSet,
}

impl EvaluatorSubmission {
    /// Registers a new evaluator with no judgments.
    pub fn new(evaluator_id: EvaluatorId) -> Self {
        Self {
            evaluator_id,
            status: EvaluationStatus::Registering,
            judgments: JudgmentSet::new(),
        }
    }

    /// Reconstitutes a submission from stored data.
    ///
    /// A stored submission holds one value per pair. Revisions go through
    /// [`record`](Self::record) instead.
    ///
    /// # Errors
    /// - `InvalidJudgment` for an off-scale value
    /// - `DuplicateJudgment` if a pair is stated twice with different values
    pub fn restore(
        evaluator_id: EvaluatorId,
        status: EvaluationStatus,
        judgments: Vec<PairwiseJudgment>,
    ) -> Result<Self, DomainError> {
        let judgments = JudgmentSet::from_judgments(judgments)?;
        Ok(Self {
            evaluator_id,
            status,
            judgments,
        })
    }

    pub fn evaluator_id(&self) -> &EvaluatorId {
        &self.evaluator_id
    }

    pub fn status(&self) -> EvaluationStatus {
        self.status
    }

    pub fn judgments(&self) -> &JudgmentSet {
        &self.judgments
    }

    pub fn is_completed(&self) -> bool {
        self.status == EvaluationStatus::Completed
    }

    /// Registering -> InProgress.
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.move_to(EvaluationStatus::InProgress)
    }

    /// InProgress -> Paused.
    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.move_to(EvaluationStatus::Paused)
    }

    /// Paused -> InProgress.
    pub fn resume(&mut self) -> Result<(), DomainError> {
        if self.status != EvaluationStatus::Paused {
            return Err(self.transition_error(EvaluationStatus::InProgress));
        }
        self.move_to(EvaluationStatus::InProgress)
    }

    /// InProgress -> Completed.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.move_to(EvaluationStatus::Completed)
    }

    /// Records or revises a judgment, returning the value it replaced.
    ///
    /// # Errors
    /// - `InvalidStateTransition` unless the survey is in progress
    /// - `InvalidJudgment` for an off-scale value
    pub fn record(&mut self, judgment: PairwiseJudgment) -> Result<Option<f64>, DomainError> {
        if !self.status.accepts_judgments() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Evaluator {} cannot record judgments while {:?}",
                    self.evaluator_id, self.status
                ),
            ));
        }
        Ok(self.judgments.update(judgment)?)
    }

    /// Judgments of a completed submission.
    ///
    /// # Errors
    /// `EvaluationNotCompleted` for any other status.
    pub fn completed_judgments(&self) -> Result<&JudgmentSet, DomainError> {
        if !self.is_completed() {
            return Err(DomainError::new(
                ErrorCode::EvaluationNotCompleted,
                format!("Evaluator {} has not completed the evaluation", self.evaluator_id),
            )
            .with_detail("evaluator_id", self.evaluator_id.as_str())
            .with_detail("status", format!("{:?}", self.status)));
        }
        Ok(&self.judgments)
    }

    fn move_to(&mut self, target: EvaluationStatus) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| self.transition_error(target))?;
        Ok(())
    }

    fn transition_error(&self, target: EvaluationStatus) -> DomainError {
        DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cannot transition from {:?} to {:?}", self.status, target),
        )
        .with_detail("evaluator_id", self.evaluator_id.as_str())
    }
}
