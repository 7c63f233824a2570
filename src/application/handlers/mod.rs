//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod analysis;

pub use analysis::{
    AlternativePriorities, CalculateGroupCommand, CalculateGroupHandler,
    CalculateHierarchyCommand, CalculateHierarchyHandler, CalculateIndividualCommand,
    CalculateIndividualHandler, CriteriaPriorities, DecisionInputs, GroupInput,
    HierarchyOutcome, MatrixInput, MonteCarloSimulationCommand, MonteCarloSimulationHandler,
    NodeConsistency, PriorityInput, SensitivityAnalysisCommand, SensitivityAnalysisHandler,
    SensitivityOutcome,
};
