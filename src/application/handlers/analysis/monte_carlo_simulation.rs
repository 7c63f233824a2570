//! MonteCarloSimulationHandler - perturbation trials for one project.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::ahp::{MonteCarloConfig, MonteCarloResult, MonteCarloSimulator};
use crate::domain::foundation::{DomainError, Fraction, ProjectId};

use super::DecisionInputs;

/// Command to run a Monte Carlo stability simulation.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulationCommand {
    pub project_id: ProjectId,
    pub inputs: DecisionInputs,
    /// Falls back to the configured default.
    pub n_simulations: Option<usize>,
    /// Must lie strictly between 0 and 1.
    pub uncertainty_level: f64,
    /// Fixed seed for a reproducible run.
    pub seed: Option<u64>,
}

/// Handler for Monte Carlo simulation.
pub struct MonteCarloSimulationHandler {
    simulator: MonteCarloSimulator,
    default_simulations: usize,
}

impl MonteCarloSimulationHandler {
    pub fn new(simulator: MonteCarloSimulator, default_simulations: usize) -> Self {
        Self {
            simulator,
            default_simulations,
        }
    }

    /// Runs the simulation; stops early with `CANCELLED` once `cancel` fires.
    pub fn handle(
        &self,
        cmd: MonteCarloSimulationCommand,
        cancel: &CancellationToken,
    ) -> Result<MonteCarloResult, DomainError> {
        let config = MonteCarloConfig {
            n_simulations: cmd.n_simulations.unwrap_or(self.default_simulations),
            uncertainty_level: Fraction::try_open("uncertainty_level", cmd.uncertainty_level)?,
            seed: cmd.seed,
        };
        let model = cmd.inputs.model()?;
        let result = self.simulator.simulate(&model, &config, cancel)?;

        info!(
            project_id = %cmd.project_id,
            seed = result.seed,
            completed = result.completed_trials,
            overall_stability = result.overall_stability,
            "monte carlo simulation served"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::collections::BTreeMap;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn command(seed: Option<u64>) -> MonteCarloSimulationCommand {
        let mut local_priorities = BTreeMap::new();
        local_priorities.insert("cost".to_string(), map(&[("x", 0.7), ("y", 0.3)]));
        local_priorities.insert("quality".to_string(), map(&[("x", 0.4), ("y", 0.6)]));
        MonteCarloSimulationCommand {
            project_id: ProjectId::new("p-1").unwrap(),
            inputs: DecisionInputs {
                global_weights: map(&[("cost", 0.6), ("quality", 0.4)]),
                local_priorities,
            },
            n_simulations: None,
            uncertainty_level: 0.1,
            seed,
        }
    }

    fn handler() -> MonteCarloSimulationHandler {
        MonteCarloSimulationHandler::new(MonteCarloSimulator::default(), 500)
    }

    #[test]
    fn uses_configured_default_trial_count() {
        let result = handler()
            .handle(command(Some(7)), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.n_simulations, 500);
        assert_eq!(result.seed, 7);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let a = handler()
            .handle(command(Some(42)), &CancellationToken::new())
            .unwrap();
        let b = handler()
            .handle(command(Some(42)), &CancellationToken::new())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_token_aborts() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = handler().handle(command(Some(1)), &cancel).unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[test]
    fn uncertainty_level_must_be_inside_unit_interval() {
        let mut cmd = command(None);
        cmd.uncertainty_level = 1.0;
        let err = handler().handle(cmd, &CancellationToken::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
