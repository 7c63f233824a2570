//! Evaluation module - evaluator survey lifecycle at the edge of the engine.
//!
//! States: registering -> in_progress -> paused <-> in_progress -> completed.

mod status;
mod submission;

pub use status::EvaluationStatus;
pub use submission::EvaluatorSubmission;
