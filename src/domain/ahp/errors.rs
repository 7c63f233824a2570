//! Engine error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Failures surfaced by the AHP engine.
///
/// Eigenvector non-convergence is deliberately absent: the solver recovers
/// by falling back to the geometric mean and reports that in the result's
/// `method`. A consistency ratio above the threshold is not an error either.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AhpError {
    #[error("judgment {left} vs {right} has value {value}, expected a value in [1/9, 9]")]
    InvalidJudgment {
        left: String,
        right: String,
        value: f64,
    },

    #[error("conflicting judgments for pair {left}/{right}: {existing} already recorded, got {incoming}")]
    DuplicateJudgment {
        left: String,
        right: String,
        existing: f64,
        incoming: f64,
    },

    #[error("comparison matrix is missing {missing_pairs} pairwise judgment(s)")]
    IncompleteMatrix { missing_pairs: usize },

    #[error("degenerate input: {reason}")]
    DegenerateMatrix { reason: String },

    #[error("no evaluator passed the consistency gate ({excluded} excluded at threshold {threshold})")]
    InsufficientConsistentData { excluded: usize, threshold: f64 },

    #[error("unknown element: {id}")]
    UnknownElement { id: String },

    #[error("duplicate element: {id}")]
    DuplicateElement { id: String },

    #[error("invalid criteria hierarchy: {reason}")]
    InvalidHierarchy { reason: String },

    #[error("missing local priorities for {node}")]
    MissingPriorities { node: String },

    #[error("element sets do not match: {reason}")]
    ElementMismatch { reason: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("computation cancelled")]
    Cancelled,
}

impl AhpError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        AhpError::DegenerateMatrix {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AhpError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_hierarchy(reason: impl Into<String>) -> Self {
        AhpError::InvalidHierarchy {
            reason: reason.into(),
        }
    }

    /// Returns the stable error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            AhpError::InvalidJudgment { .. } => ErrorCode::InvalidJudgment,
            AhpError::DuplicateJudgment { .. } => ErrorCode::DuplicateJudgment,
            AhpError::IncompleteMatrix { .. } => ErrorCode::IncompleteMatrix,
            AhpError::DegenerateMatrix { .. } => ErrorCode::DegenerateMatrix,
            AhpError::InsufficientConsistentData { .. } => ErrorCode::InsufficientConsistentData,
            AhpError::UnknownElement { .. } => ErrorCode::UnknownElement,
            AhpError::DuplicateElement { .. } => ErrorCode::ValidationFailed,
            AhpError::InvalidHierarchy { .. } => ErrorCode::InvalidHierarchy,
            AhpError::MissingPriorities { .. } => ErrorCode::MissingPriorities,
            AhpError::ElementMismatch { .. } => ErrorCode::ElementMismatch,
            AhpError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            AhpError::Cancelled => ErrorCode::Cancelled,
        }
    }
}

impl From<AhpError> for DomainError {
    fn from(err: AhpError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            AhpError::InvalidJudgment { left, right, .. }
            | AhpError::DuplicateJudgment { left, right, .. } => DomainError::new(code, message)
                .with_detail("left", left)
                .with_detail("right", right),
            AhpError::UnknownElement { id } | AhpError::DuplicateElement { id } => {
                DomainError::new(code, message).with_detail("element", id)
            }
            AhpError::InvalidParameter { name, .. } => {
                DomainError::new(code, message).with_detail("parameter", name)
            }
            _ => DomainError::new(code, message),
        }
    }
}

impl From<ValidationError> for AhpError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::OutOfRange { ref field, .. }
            | ValidationError::EmptyField { ref field }
            | ValidationError::InvalidFormat { ref field, .. } => {
                AhpError::invalid_parameter(field.clone(), err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_judgment_maps_to_domain_error_with_pair_details() {
        let err = AhpError::InvalidJudgment {
            left: "C1".into(),
            right: "C2".into(),
            value: 12.0,
        };
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::InvalidJudgment);
        assert_eq!(domain.details.get("left"), Some(&"C1".to_string()));
        assert_eq!(domain.details.get("right"), Some(&"C2".to_string()));
    }

    #[test]
    fn insufficient_data_message_mentions_threshold() {
        let err = AhpError::InsufficientConsistentData {
            excluded: 3,
            threshold: 0.1,
        };
        assert!(err.to_string().contains("3 excluded"));
        assert!(err.to_string().contains("0.1"));
    }

    #[test]
    fn validation_error_becomes_invalid_parameter() {
        let err: AhpError = ValidationError::out_of_range("variation_range", 0.0, 1.0, 2.0).into();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        match err {
            AhpError::InvalidParameter { name, .. } => assert_eq!(name, "variation_range"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
