//! AHP engine - pairwise comparison, priority derivation, and the analyses
//! built on top of them.
//!
//! # Module Structure
//!
//! - `judgment` - Pairwise judgments and the judgment set
//! - `comparison_matrix` - Reciprocal matrix builder and gap estimation
//! - `priority_solver` - Geometric mean and eigenvector priorities
//! - `consistency` - CI/CR and the random index table
//! - `hierarchy` - Criteria tree validation
//! - `hierarchical_aggregator` - Global weights and alternative scores
//! - `group_aggregator` - AIP/AIJ group aggregation with a consistency gate
//! - `decision_model` - Weighted scoring shared by the robustness analyses
//! - `sensitivity` - One-at-a-time weight sweeps
//! - `monte_carlo` - Seeded weight perturbation
//!
//! Every operation here is pure and synchronous. Callers that need to keep an
//! async runtime responsive move the work onto a blocking thread.

mod comparison_matrix;
mod consistency;
mod decision_model;
mod errors;
mod group_aggregator;
mod hierarchical_aggregator;
mod hierarchy;
mod judgment;
mod monte_carlo;
mod priority_solver;
mod sensitivity;

pub use comparison_matrix::ComparisonMatrix;
pub use consistency::{ConsistencyChecker, ConsistencyReport, CONSISTENCY_THRESHOLD, RANDOM_INDEX};
pub use decision_model::{DecisionModel, GlobalScore};
pub use errors::AhpError;
pub use group_aggregator::{
    AggregateConsistency, AggregationMethod, EvaluatorMatrix, EvaluatorPriority, GroupAggregator,
    GroupPolicy, GroupPriorityResult,
};
pub use hierarchical_aggregator::{
    CriterionWeight, HierarchicalAggregator, HierarchyResult, LocalPriorities, ScoringMode,
};
pub use hierarchy::{Alternative, CriteriaTree, Criterion};
pub use judgment::{JudgmentSet, PairwiseJudgment, SCALE_MAX, SCALE_MIN};
pub use monte_carlo::{
    AlternativeFrequency, CriterionRankStability, MonteCarloConfig, MonteCarloResult,
    MonteCarloSimulator, DEFAULT_MAX_SIMULATIONS,
};
pub use priority_solver::{
    DerivationMethod, GapPolicy, PriorityMethod, PriorityResult, PrioritySolver, SolverConfig,
    DEFAULT_EIGEN_TOLERANCE, DEFAULT_MAX_ITERATIONS, SUM_TOLERANCE,
};
pub use sensitivity::{
    RankReversalPoint, SensitivityAnalyzer, SensitivityResult, DEFAULT_SENSITIVITY_STEPS,
};
