//! Engine configuration - solver, consistency and simulation limits

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::ahp::{
    AhpError, ConsistencyChecker, MonteCarloSimulator, PriorityMethod, PrioritySolver,
    SensitivityAnalyzer, SolverConfig, CONSISTENCY_THRESHOLD, DEFAULT_EIGEN_TOLERANCE,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_SIMULATIONS, DEFAULT_SENSITIVITY_STEPS,
};

/// AHP engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Consistency ratio at or below which a matrix is acceptable
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold: f64,

    /// Priority method used when a request names none
    #[serde(default)]
    pub default_method: PriorityMethod,

    /// Power-iteration convergence tolerance
    #[serde(default = "default_eigen_tolerance")]
    pub eigen_tolerance: f64,

    /// Power-iteration cap before falling back to the geometric mean
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Samples per criterion in a sensitivity sweep
    #[serde(default = "default_sensitivity_steps")]
    pub sensitivity_steps: usize,

    /// Monte Carlo trials when a request names none
    #[serde(default = "default_simulations")]
    pub default_simulations: usize,

    /// Upper bound on Monte Carlo trials per request
    #[serde(default = "default_max_simulations")]
    pub max_simulations: usize,

    /// Priority cache entries; 0 disables caching
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.consistency_threshold > 0.0 && self.consistency_threshold <= 1.0) {
            return Err(ValidationError::InvalidConsistencyThreshold);
        }
        if !(self.eigen_tolerance.is_finite() && self.eigen_tolerance > 0.0) {
            return Err(ValidationError::InvalidEigenTolerance);
        }
        if self.max_iterations == 0 {
            return Err(ValidationError::InvalidMaxIterations);
        }
        if self.sensitivity_steps < 2 {
            return Err(ValidationError::InvalidSensitivitySteps);
        }
        if self.default_simulations == 0 || self.default_simulations > self.max_simulations {
            return Err(ValidationError::InvalidSimulationCount);
        }
        Ok(())
    }

    pub fn solver(&self) -> PrioritySolver {
        let config = SolverConfig {
            tolerance: self.eigen_tolerance,
            max_iterations: self.max_iterations,
            ..SolverConfig::default()
        };
        PrioritySolver::new(config, ConsistencyChecker::new(self.consistency_threshold))
    }

    pub fn sensitivity_analyzer(&self) -> Result<SensitivityAnalyzer, AhpError> {
        SensitivityAnalyzer::new(self.sensitivity_steps)
    }

    pub fn monte_carlo_simulator(&self) -> MonteCarloSimulator {
        MonteCarloSimulator::new(self.max_simulations)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: default_consistency_threshold(),
            default_method: PriorityMethod::default(),
            eigen_tolerance: default_eigen_tolerance(),
            max_iterations: default_max_iterations(),
            sensitivity_steps: default_sensitivity_steps(),
            default_simulations: default_simulations(),
            max_simulations: default_max_simulations(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_consistency_threshold() -> f64 {
    CONSISTENCY_THRESHOLD
}

fn default_eigen_tolerance() -> f64 {
    DEFAULT_EIGEN_TOLERANCE
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_sensitivity_steps() -> usize {
    DEFAULT_SENSITIVITY_STEPS
}

fn default_simulations() -> usize {
    1000
}

fn default_max_simulations() -> usize {
    DEFAULT_MAX_SIMULATIONS
}

fn default_cache_capacity() -> usize {
    1024
}
