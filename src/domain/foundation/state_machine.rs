//! State machine trait for lifecycle status enums.
//!
//! The engine itself is stateless; lifecycles only exist at its edge, where an
//! evaluator's judgment collection moves through registration, answering and
//! pausing before a completed judgment set is handed to the engine.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list the valid outgoing transitions; validated transitions
/// and terminal-state checks come for free.
///
/// ```ignore
/// let next = EvaluationStatus::Paused.transition_to(EvaluationStatus::InProgress)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Review {
        Open,
        Revising,
        Closed,
    }

    impl StateMachine for Review {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Review::Open => vec![Review::Revising, Review::Closed],
                Review::Revising => vec![Review::Open],
                Review::Closed => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_target() {
        assert_eq!(Review::Open.transition_to(Review::Closed), Ok(Review::Closed));
    }

    #[test]
    fn transition_to_fails_for_unlisted_target() {
        let err = Review::Revising.transition_to(Review::Closed).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Revising to Closed"));
    }

    #[test]
    fn closed_is_terminal() {
        assert!(Review::Closed.is_terminal());
        assert!(!Review::Open.is_terminal());
    }

    #[test]
    fn default_can_transition_matches_listing() {
        assert!(Review::Revising.can_transition_to(&Review::Open));
        assert!(!Review::Open.can_transition_to(&Review::Open));
    }
}
