//! Property tests for the priority engine.
//!
//! Covers the invariants every derived result must hold regardless of input:
//! weights on the simplex, exact recovery from consistent matrices,
//! reciprocity of built matrices, and idempotence of group aggregation.

use ahp_engine::domain::ahp::{
    ComparisonMatrix, DecisionModel, EvaluatorPriority, GroupAggregator, GroupPolicy,
    MonteCarloConfig, MonteCarloSimulator, PairwiseJudgment, PriorityMethod, PrioritySolver,
    SCALE_MAX, SCALE_MIN,
};
use ahp_engine::domain::foundation::{EvaluatorId, Fraction};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

fn element_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("e{}", i)).collect()
}

/// Judgments for every upper-triangle pair from a flat value list.
fn judgments_from(n: usize, values: &[f64]) -> Vec<PairwiseJudgment> {
    let ids = element_ids(n);
    let mut judgments = Vec::new();
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            judgments.push(PairwiseJudgment::new(ids[i].clone(), ids[j].clone(), values[k]));
            k += 1;
        }
    }
    judgments
}

/// A size and one valid judgment value per pair.
fn complete_judgments() -> impl Strategy<Value = (usize, Vec<f64>)> {
    (2usize..=9).prop_flat_map(|n| {
        let pairs = n * (n - 1) / 2;
        (Just(n), prop::collection::vec(SCALE_MIN..=SCALE_MAX, pairs))
    })
}

fn method() -> impl Strategy<Value = PriorityMethod> {
    prop_oneof![Just(PriorityMethod::GeometricMean), Just(PriorityMethod::Eigenvector)]
}

proptest! {
    #[test]
    fn weights_are_positive_and_sum_to_one((n, values) in complete_judgments(), method in method()) {
        let matrix = ComparisonMatrix::build(&element_ids(n), &judgments_from(n, &values)).unwrap();
        let result = PrioritySolver::default().solve(&matrix, method).unwrap();

        prop_assert_eq!(result.weights.len(), n);
        prop_assert!(result.weights.iter().all(|w| *w > 0.0));
        prop_assert!((result.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        prop_assert!(result.consistency_ratio >= 0.0);
        prop_assert!(result.consistency_ratio.is_finite());
    }

    #[test]
    fn built_matrix_is_reciprocal((n, values) in complete_judgments()) {
        let matrix = ComparisonMatrix::build(&element_ids(n), &judgments_from(n, &values)).unwrap();

        for i in 0..n {
            prop_assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..n {
                let forward = matrix.get(i, j).unwrap();
                let backward = matrix.get(j, i).unwrap();
                prop_assert_eq!(forward * backward, 1.0);
            }
        }
    }

    #[test]
    fn consistent_matrix_recovers_its_weights(
        raw in prop::collection::vec(1.0f64..3.0, 2..=9),
        method in method(),
    ) {
        let n = raw.len();
        let ids = element_ids(n);
        let mut judgments = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                judgments.push(PairwiseJudgment::new(ids[i].clone(), ids[j].clone(), raw[i] / raw[j]));
            }
        }
        let matrix = ComparisonMatrix::build(&ids, &judgments).unwrap();
        let result = PrioritySolver::default().solve(&matrix, method).unwrap();

        let total: f64 = raw.iter().sum();
        for (derived, expected) in result.weights.iter().zip(raw.iter()) {
            prop_assert!((derived - expected / total).abs() < 1e-6);
        }
        prop_assert!(result.consistency_ratio < 1e-6);
    }

    #[test]
    fn identical_evaluators_aggregate_to_the_individual(
        (n, values) in complete_judgments(),
        copies in 1usize..6,
    ) {
        let matrix = ComparisonMatrix::build(&element_ids(n), &judgments_from(n, &values)).unwrap();
        let individual = PrioritySolver::default()
            .solve(&matrix, PriorityMethod::GeometricMean)
            .unwrap();
        let evaluators: Vec<EvaluatorPriority> = (0..copies)
            .map(|i| EvaluatorPriority {
                evaluator_id: EvaluatorId::new(format!("ev{}", i)).unwrap(),
                result: individual.clone(),
            })
            .collect();

        let group = GroupAggregator::aggregate_priorities(
            &evaluators,
            &GroupPolicy::with_threshold(None),
        )
        .unwrap();

        prop_assert_eq!(group.included_count, copies);
        for (g, w) in group.weights.iter().zip(individual.weights.iter()) {
            prop_assert!((g - w).abs() < 1e-9);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn monte_carlo_is_reproducible_for_a_seed(seed in any::<u64>(), level in 0.01f64..0.9) {
        let mut weights = BTreeMap::new();
        weights.insert("cost".to_string(), 0.5);
        weights.insert("quality".to_string(), 0.3);
        weights.insert("risk".to_string(), 0.2);
        let mut local = BTreeMap::new();
        for (criterion, x) in [("cost", 0.6), ("quality", 0.3), ("risk", 0.5)] {
            let mut priorities = BTreeMap::new();
            priorities.insert("x".to_string(), x);
            priorities.insert("y".to_string(), 1.0 - x);
            local.insert(criterion.to_string(), priorities);
        }
        let model = DecisionModel::new(&weights, &local).unwrap();
        let config = MonteCarloConfig {
            n_simulations: 200,
            uncertainty_level: Fraction::try_open("uncertainty_level", level).unwrap(),
            seed: Some(seed),
        };

        let simulator = MonteCarloSimulator::default();
        let a = simulator.simulate(&model, &config, &CancellationToken::new()).unwrap();
        let b = simulator.simulate(&model, &config, &CancellationToken::new()).unwrap();

        prop_assert_eq!(&a, &b);
        prop_assert!((0.0..=1.0).contains(&a.overall_stability));
        prop_assert_eq!(a.completed_trials + a.skipped_trials, 200);
    }
}
