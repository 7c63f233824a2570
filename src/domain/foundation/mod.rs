//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the state machine trait
//! that form the vocabulary shared by the AHP engine and its callers.

mod errors;
mod fraction;
mod ids;
mod state_machine;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use fraction::Fraction;
pub use ids::{EvaluatorId, ProjectId};
pub use state_machine::StateMachine;
