//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `ahp` - Priority derivation, consistency, aggregation and robustness analyses
//! - `evaluation` - Evaluator survey lifecycle feeding completed judgments to `ahp`

pub mod ahp;
pub mod evaluation;
pub mod foundation;
