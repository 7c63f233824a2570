//! Application layer - Commands and Handlers.
//!
//! This layer turns requests into domain calls and routes matrix solves
//! through the priority cache port. Handlers are synchronous; the HTTP
//! adapter runs them on blocking threads.

pub mod handlers;

pub use handlers::{
    CalculateGroupCommand, CalculateGroupHandler, CalculateHierarchyCommand,
    CalculateHierarchyHandler, CalculateIndividualCommand, CalculateIndividualHandler,
    DecisionInputs, MonteCarloSimulationCommand, MonteCarloSimulationHandler,
    SensitivityAnalysisCommand, SensitivityAnalysisHandler,
};
