//! Evaluation status state machine.
//!
//! Tracks one evaluator's progress through a judgment survey. Only the
//! completed state releases judgments to the engine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Evaluator session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Evaluator invited, no judgments yet.
    Registering,

    /// Evaluator is answering pairwise comparisons.
    InProgress,

    /// Evaluator left mid-survey; answers so far are kept.
    Paused,

    /// All judgments submitted. Terminal.
    Completed,
}

impl EvaluationStatus {
    /// Returns true if judgments may be recorded in this state.
    pub fn accepts_judgments(&self) -> bool {
        matches!(self, EvaluationStatus::InProgress)
    }
}

impl StateMachine for EvaluationStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use EvaluationStatus::*;
        match self {
            Registering => vec![InProgress],
            InProgress => vec![Paused, Completed],
            Paused => vec![InProgress],
            Completed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_can_start() {
        let result = EvaluationStatus::Registering.transition_to(EvaluationStatus::InProgress);
        assert_eq!(result, Ok(EvaluationStatus::InProgress));
    }

    #[test]
    fn registering_cannot_complete_directly() {
        assert!(!EvaluationStatus::Registering.can_transition_to(&EvaluationStatus::Completed));
    }

    #[test]
    fn in_progress_can_pause_and_resume() {
        let paused = EvaluationStatus::InProgress
            .transition_to(EvaluationStatus::Paused)
            .unwrap();
        let resumed = paused.transition_to(EvaluationStatus::InProgress);
        assert_eq!(resumed, Ok(EvaluationStatus::InProgress));
    }

    #[test]
    fn paused_cannot_complete_without_resuming() {
        let result = EvaluationStatus::Paused.transition_to(EvaluationStatus::Completed);
        assert!(result.is_err());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(EvaluationStatus::Completed.is_terminal());
        assert!(!EvaluationStatus::Paused.is_terminal());
    }

    #[test]
    fn only_in_progress_accepts_judgments() {
        assert!(EvaluationStatus::InProgress.accepts_judgments());
        assert!(!EvaluationStatus::Paused.accepts_judgments());
        assert!(!EvaluationStatus::Completed.accepts_judgments());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&EvaluationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
