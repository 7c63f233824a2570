//! Analysis handlers - priority calculation and robustness analyses.

mod calculate_group;
mod calculate_hierarchy;
mod calculate_individual;
mod monte_carlo_simulation;
mod sensitivity_analysis;

use std::collections::BTreeMap;

use crate::domain::ahp::DecisionModel;
use crate::domain::foundation::DomainError;

pub use calculate_group::{CalculateGroupCommand, CalculateGroupHandler, GroupInput};
pub use calculate_hierarchy::{
    AlternativePriorities, CalculateHierarchyCommand, CalculateHierarchyHandler,
    CriteriaPriorities, HierarchyOutcome, NodeConsistency, PriorityInput,
};
pub use calculate_individual::{CalculateIndividualCommand, CalculateIndividualHandler, MatrixInput};
pub use monte_carlo_simulation::{MonteCarloSimulationCommand, MonteCarloSimulationHandler};
pub use sensitivity_analysis::{
    SensitivityAnalysisCommand, SensitivityAnalysisHandler, SensitivityOutcome,
};

/// Final weights of a project as consumed by the robustness analyses.
#[derive(Debug, Clone, Default)]
pub struct DecisionInputs {
    /// Global weight per leaf criterion.
    pub global_weights: BTreeMap<String, f64>,
    /// Alternative priorities per leaf criterion.
    pub local_priorities: BTreeMap<String, BTreeMap<String, f64>>,
}

impl DecisionInputs {
    pub fn model(&self) -> Result<DecisionModel, DomainError> {
        Ok(DecisionModel::new(&self.global_weights, &self.local_priorities)?)
    }
}
