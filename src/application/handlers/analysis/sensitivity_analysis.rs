//! SensitivityAnalysisHandler - weight sweeps for one project.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ahp::{GlobalScore, SensitivityAnalyzer, SensitivityResult};
use crate::domain::foundation::{DomainError, Fraction, ProjectId};

use super::DecisionInputs;

/// Command to sweep criterion weights.
#[derive(Debug, Clone)]
pub struct SensitivityAnalysisCommand {
    pub project_id: ProjectId,
    pub inputs: DecisionInputs,
    /// Criteria to sweep; empty sweeps all of them.
    pub target_criteria: Vec<String>,
    /// Must lie strictly between 0 and 1.
    pub variation_range: f64,
}

/// Sweep results alongside the unperturbed ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOutcome {
    pub project_id: ProjectId,
    pub baseline_ranking: Vec<GlobalScore>,
    pub results: Vec<SensitivityResult>,
}

/// Handler for sensitivity analysis.
pub struct SensitivityAnalysisHandler {
    analyzer: SensitivityAnalyzer,
}

impl SensitivityAnalysisHandler {
    pub fn new(analyzer: SensitivityAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn handle(&self, cmd: SensitivityAnalysisCommand) -> Result<SensitivityOutcome, DomainError> {
        let range = Fraction::try_open("variation_range", cmd.variation_range)?;
        let model = cmd.inputs.model()?;
        let results = self.analyzer.analyze(&model, &cmd.target_criteria, range)?;

        info!(
            project_id = %cmd.project_id,
            targets = results.len(),
            baseline_top = model.baseline_top(),
            "sensitivity analysis served"
        );

        Ok(SensitivityOutcome {
            project_id: cmd.project_id,
            baseline_ranking: model.baseline_ranking(),
            results,
        })
    }
}
