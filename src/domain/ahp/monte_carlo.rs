//! Monte Carlo Stability Simulator - seeded random perturbation of all weights.
//!
//! Trials run on the rayon pool. Each trial draws from its own generator
//! seeded from `(seed, trial index)`, so a run is reproducible regardless of
//! how trials are scheduled across threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::decision_model::top_index;
use super::{AhpError, DecisionModel};
use crate::domain::foundation::Fraction;

/// Upper bound on trials per run unless configured otherwise.
pub const DEFAULT_MAX_SIMULATIONS: usize = 100_000;

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloConfig {
    pub n_simulations: usize,
    /// Half-width of the multiplicative perturbation band.
    pub uncertainty_level: Fraction,
    /// Fixed seed for a reproducible run; `None` draws one.
    pub seed: Option<u64>,
}

/// Rank stability of one criterion across trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionRankStability {
    pub criterion_id: String,
    pub baseline_rank: usize,
    pub most_frequent_rank: usize,
    /// Share of trials in which the criterion held its most frequent rank.
    pub stability: f64,
}

/// How often an alternative led, and how its score moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeFrequency {
    pub alternative_id: String,
    pub top_frequency: f64,
    pub mean_score: f64,
    pub std_dev_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Seed actually used; replaying with it reproduces the run.
    pub seed: u64,
    pub n_simulations: usize,
    pub completed_trials: usize,
    pub skipped_trials: usize,
    pub uncertainty_level: f64,
    pub baseline_top_alternative: String,
    /// Share of completed trials whose top alternative matches the baseline.
    pub overall_stability: f64,
    pub criteria: Vec<CriterionRankStability>,
    pub alternatives: Vec<AlternativeFrequency>,
}

struct TrialOutcome {
    top: usize,
    criterion_ranks: Vec<usize>,
    scores: Vec<f64>,
}

/// Runs perturbation trials against a decision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloSimulator {
    max_simulations: usize,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self {
            max_simulations: DEFAULT_MAX_SIMULATIONS,
        }
    }
}

impl MonteCarloSimulator {
    pub fn new(max_simulations: usize) -> Self {
        Self { max_simulations }
    }

    /// Perturbs every weight by a factor drawn from `[1-u, 1+u]`,
    /// renormalizes, and records the leader and criterion ranks per trial.
    ///
    /// A trial that produces unusable weights is skipped and counted; it never
    /// aborts the run. Frequencies are taken over completed trials.
    ///
    /// # Errors
    /// - `InvalidParameter` for a zero or oversized trial count, or an
    ///   uncertainty level outside `(0, 1)`
    /// - `Cancelled` once `cancel` fires
    /// - `DegenerateMatrix` if every trial was skipped
    pub fn simulate(
        &self,
        model: &DecisionModel,
        config: &MonteCarloConfig,
        cancel: &CancellationToken,
    ) -> Result<MonteCarloResult, AhpError> {
        self.validate(config)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let uncertainty = config.uncertainty_level.value();

        let outcomes: Vec<Option<TrialOutcome>> = (0..config.n_simulations)
            .into_par_iter()
            .map(|trial| {
                if cancel.is_cancelled() {
                    return Err(AhpError::Cancelled);
                }
                Ok(run_trial(model, seed, trial, uncertainty))
            })
            .collect::<Result<_, _>>()?;

        let result = tally(model, config, seed, &outcomes)?;

        if result.skipped_trials > 0 {
            warn!(
                seed,
                skipped = result.skipped_trials,
                "monte carlo trials skipped"
            );
        }
        info!(
            seed,
            n_simulations = config.n_simulations,
            uncertainty_level = uncertainty,
            overall_stability = result.overall_stability,
            "monte carlo simulation completed"
        );
        Ok(result)
    }

    fn validate(&self, config: &MonteCarloConfig) -> Result<(), AhpError> {
        if config.n_simulations == 0 || config.n_simulations > self.max_simulations {
            return Err(AhpError::invalid_parameter(
                "n_simulations",
                format!(
                    "must be between 1 and {}, got {}",
                    self.max_simulations, config.n_simulations
                ),
            ));
        }
        let u = config.uncertainty_level.value();
        if u <= 0.0 || u >= 1.0 {
            return Err(AhpError::invalid_parameter(
                "uncertainty_level",
                format!("must be strictly between 0 and 1, got {}", u),
            ));
        }
        Ok(())
    }
}

/// Multiplier that spreads trial indices across the seed space.
const TRIAL_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for one trial. Nearby run seeds share no trial streams.
fn trial_seed(seed: u64, trial: usize) -> u64 {
    seed ^ (trial as u64).wrapping_add(1).wrapping_mul(TRIAL_SEED_MIX)
}

fn run_trial(
    model: &DecisionModel,
    seed: u64,
    trial: usize,
    uncertainty: f64,
) -> Option<TrialOutcome> {
    let mut rng = StdRng::seed_from_u64(trial_seed(seed, trial));
    let mut weights: Vec<f64> = model
        .weights()
        .iter()
        .map(|w| w * rng.gen_range(1.0 - uncertainty..=1.0 + uncertainty))
        .collect();

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }
    weights.iter_mut().for_each(|w| *w /= sum);

    let scores = model.scores_with(&weights);
    if scores.iter().any(|s| !s.is_finite()) {
        return None;
    }

    Some(TrialOutcome {
        top: top_index(&scores),
        criterion_ranks: rank_positions(&weights),
        scores,
    })
}

/// 1-based rank of each weight, largest first; ties go to the lower index.
fn rank_positions(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
    let mut ranks = vec![0; weights.len()];
    for (position, idx) in order.into_iter().enumerate() {
        ranks[idx] = position + 1;
    }
    ranks
}

fn tally(
    model: &DecisionModel,
    config: &MonteCarloConfig,
    seed: u64,
    outcomes: &[Option<TrialOutcome>],
) -> Result<MonteCarloResult, AhpError> {
    let criteria = model.criteria();
    let alternatives = model.alternatives();
    let baseline_top = model.top_with(model.weights());
    let baseline_ranks = rank_positions(model.weights());

    let mut top_counts = vec![0usize; alternatives.len()];
    let mut rank_counts = vec![vec![0usize; criteria.len()]; criteria.len()];
    // Welford running mean and squared deviation per alternative
    let mut means = vec![0.0; alternatives.len()];
    let mut m2 = vec![0.0; alternatives.len()];
    let mut completed = 0usize;

    for outcome in outcomes.iter().flatten() {
        completed += 1;
        top_counts[outcome.top] += 1;
        for (criterion, rank) in outcome.criterion_ranks.iter().enumerate() {
            rank_counts[criterion][rank - 1] += 1;
        }
        for (idx, score) in outcome.scores.iter().enumerate() {
            let delta = score - means[idx];
            means[idx] += delta / completed as f64;
            m2[idx] += delta * (score - means[idx]);
        }
    }

    if completed == 0 {
        return Err(AhpError::degenerate("every simulation trial was skipped"));
    }
    let denominator = completed as f64;

    let criteria_stability = criteria
        .iter()
        .enumerate()
        .map(|(idx, id)| {
            let (mode, count) = rank_counts[idx]
                .iter()
                .enumerate()
                .fold((0, 0), |best, (rank, &count)| {
                    if count > best.1 {
                        (rank, count)
                    } else {
                        best
                    }
                });
            CriterionRankStability {
                criterion_id: id.clone(),
                baseline_rank: baseline_ranks[idx],
                most_frequent_rank: mode + 1,
                stability: count as f64 / denominator,
            }
        })
        .collect();

    let alternative_frequencies = alternatives
        .iter()
        .enumerate()
        .map(|(idx, id)| AlternativeFrequency {
            alternative_id: id.clone(),
            top_frequency: top_counts[idx] as f64 / denominator,
            mean_score: means[idx],
            std_dev_score: (m2[idx] / denominator).sqrt(),
        })
        .collect();

    Ok(MonteCarloResult {
        seed,
        n_simulations: config.n_simulations,
        completed_trials: completed,
        skipped_trials: outcomes.len() - completed,
        uncertainty_level: config.uncertainty_level.value(),
        baseline_top_alternative: alternatives[baseline_top].clone(),
        overall_stability: top_counts[baseline_top] as f64 / denominator,
        criteria: criteria_stability,
        alternatives: alternative_frequencies,
    })
}
