//! Hierarchical Weight Aggregator - global criterion weights and alternative scores.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::decision_model::{normalize_non_negative, rank_scores};
use super::priority_solver::SUM_TOLERANCE;
use super::{AhpError, Alternative, CriteriaTree, DecisionModel, GlobalScore, PriorityResult};

/// How alternative scores are synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Local priorities used as-is.
    #[default]
    Distributive,
    /// Local priorities divided by the best alternative under each leaf.
    Ideal,
}

/// Local priorities per sibling group and per leaf criterion.
///
/// Criteria groups are keyed by parent id, with `None` for the goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalPriorities {
    criteria: HashMap<Option<String>, BTreeMap<String, f64>>,
    alternatives: HashMap<String, BTreeMap<String, f64>>,
}

impl LocalPriorities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local weights of the children of `parent`.
    pub fn with_criteria<I, K>(mut self, parent: Option<&str>, weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.criteria.insert(
            parent.map(str::to_string),
            weights.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        );
        self
    }

    /// Sets the local weights of the children of `parent` from a solved matrix.
    pub fn with_criteria_result(self, parent: Option<&str>, result: &PriorityResult) -> Self {
        let pairs = result.element_ids.iter().cloned().zip(result.weights.iter().copied());
        self.with_criteria(parent, pairs)
    }

    /// Sets the local priorities of the alternatives under a leaf criterion.
    pub fn with_alternatives<I, K>(mut self, leaf: &str, priorities: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.alternatives.insert(
            leaf.to_string(),
            priorities.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        );
        self
    }

    /// Sets the local priorities under a leaf criterion from a solved matrix.
    pub fn with_alternatives_result(self, leaf: &str, result: &PriorityResult) -> Self {
        let pairs = result.element_ids.iter().cloned().zip(result.weights.iter().copied());
        self.with_alternatives(leaf, pairs)
    }
}

/// Local and global weight of one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub criterion_id: String,
    pub parent_id: Option<String>,
    pub level: u32,
    pub local_weight: f64,
    pub global_weight: f64,
    pub is_leaf: bool,
}

/// Output of a hierarchical synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyResult {
    /// Every criterion, parents before children.
    pub criteria: Vec<CriterionWeight>,
    /// Ranked distributive scores.
    pub distributive_scores: Vec<GlobalScore>,
    /// Ranked ideal-mode scores, renormalized to sum to 1.
    pub ideal_scores: Vec<GlobalScore>,
    /// Normalized local alternative priorities, keyed by leaf then alternative.
    pub alternative_priorities: BTreeMap<String, BTreeMap<String, f64>>,
}

impl HierarchyResult {
    /// Ranked scores in the requested mode.
    pub fn scores(&self, mode: ScoringMode) -> &[GlobalScore] {
        match mode {
            ScoringMode::Distributive => &self.distributive_scores,
            ScoringMode::Ideal => &self.ideal_scores,
        }
    }

    /// Global weights of the leaf criteria.
    pub fn leaf_global_weights(&self) -> BTreeMap<String, f64> {
        self.criteria
            .iter()
            .filter(|c| c.is_leaf)
            .map(|c| (c.criterion_id.clone(), c.global_weight))
            .collect()
    }

    /// Scoring model over the leaf criteria, for robustness analyses.
    pub fn decision_model(&self) -> Result<DecisionModel, AhpError> {
        DecisionModel::new(&self.leaf_global_weights(), &self.alternative_priorities)
    }
}

/// Propagates local priorities through a criteria tree.
pub struct HierarchicalAggregator;

impl HierarchicalAggregator {
    /// Computes global criterion weights and both scoring modes.
    ///
    /// Every sibling group and every leaf must have local priorities that
    /// cover exactly its members; groups are renormalized before use.
    ///
    /// # Errors
    /// - `MissingPriorities` for a group or leaf with no priorities, or a
    ///   member missing from its group
    /// - `UnknownElement` for priorities naming an element outside the group
    /// - `InvalidHierarchy` for alternative priorities under a non-leaf
    /// - `DegenerateMatrix` for an all-zero or negative group
    pub fn aggregate(
        tree: &CriteriaTree,
        alternatives: &[Alternative],
        local: &LocalPriorities,
    ) -> Result<HierarchyResult, AhpError> {
        let alternative_ids = sorted_alternative_ids(alternatives)?;

        for parent in local.criteria.keys().flatten() {
            if tree.get(parent).is_none() {
                return Err(AhpError::UnknownElement { id: parent.clone() });
            }
            if tree.is_leaf(parent) {
                return Err(AhpError::invalid_hierarchy(format!(
                    "criterion {} has no children to weight",
                    parent
                )));
            }
        }

        // Local weights per criterion, normalized within each sibling group.
        let mut local_weights: HashMap<&str, f64> = HashMap::with_capacity(tree.len());
        for (parent, children) in tree.sibling_groups() {
            let group_key = parent.map(str::to_string);
            let node = parent.unwrap_or("goal");
            let group = local.criteria.get(&group_key).ok_or_else(|| {
                AhpError::MissingPriorities {
                    node: node.to_string(),
                }
            })?;
            let weights = cover_exactly(node, &children, group)?;
            for (child, weight) in children.iter().zip(weights) {
                local_weights.insert(*child, weight);
            }
        }

        let mut global_weights: HashMap<&str, f64> = HashMap::with_capacity(tree.len());
        let mut criteria = Vec::with_capacity(tree.len());
        for id in tree.top_down() {
            let parent = tree.parent_of(id);
            let parent_global = parent.and_then(|p| global_weights.get(p)).copied().unwrap_or(1.0);
            let local_weight = local_weights.get(id).copied().unwrap_or(0.0);
            let global_weight = local_weight * parent_global;
            global_weights.insert(id, global_weight);
            criteria.push(CriterionWeight {
                criterion_id: id.to_string(),
                parent_id: parent.map(str::to_string),
                level: tree.level_of(id).unwrap_or(1),
                local_weight,
                global_weight,
                is_leaf: tree.is_leaf(id),
            });
        }

        let leaves = tree.leaves();
        let leaf_sum: f64 = leaves.iter().map(|l| global_weights[l]).sum();
        if (leaf_sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(AhpError::degenerate(format!(
                "leaf global weights sum to {}",
                leaf_sum
            )));
        }

        for leaf in local.alternatives.keys() {
            if tree.get(leaf).is_none() {
                return Err(AhpError::UnknownElement { id: leaf.clone() });
            }
            if !tree.is_leaf(leaf) {
                return Err(AhpError::invalid_hierarchy(format!(
                    "alternatives are scored against leaf criteria only, {} has children",
                    leaf
                )));
            }
        }

        let alternative_refs: Vec<&str> = alternative_ids.iter().map(String::as_str).collect();
        let mut distributive = vec![0.0; alternative_ids.len()];
        let mut ideal = vec![0.0; alternative_ids.len()];
        let mut alternative_priorities = BTreeMap::new();
        for leaf in &leaves {
            let priorities = local.alternatives.get(*leaf).ok_or_else(|| {
                AhpError::MissingPriorities {
                    node: leaf.to_string(),
                }
            })?;
            let normalized = cover_exactly(leaf, &alternative_refs, priorities)?;
            let best = normalized.iter().copied().fold(0.0, f64::max);
            let weight = global_weights[leaf];
            for (idx, p) in normalized.iter().enumerate() {
                distributive[idx] += weight * p;
                ideal[idx] += weight * p / best;
            }
            alternative_priorities.insert(
                leaf.to_string(),
                alternative_ids.iter().cloned().zip(normalized).collect(),
            );
        }
        normalize_non_negative(&mut ideal, "ideal scores")?;

        Ok(HierarchyResult {
            criteria,
            distributive_scores: rank_scores(&alternative_ids, &distributive),
            ideal_scores: rank_scores(&alternative_ids, &ideal),
            alternative_priorities,
        })
    }
}

fn sorted_alternative_ids(alternatives: &[Alternative]) -> Result<Vec<String>, AhpError> {
    if alternatives.is_empty() {
        return Err(AhpError::invalid_parameter(
            "alternatives",
            "at least one alternative is required",
        ));
    }
    let mut ids: Vec<String> = alternatives.iter().map(|a| a.id.clone()).collect();
    ids.sort();
    if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(AhpError::DuplicateElement { id: pair[0].clone() });
    }
    Ok(ids)
}

/// Returns `members`' values from `group`, normalized, or fails if the group
/// names anything else or omits a member.
fn cover_exactly(
    node: &str,
    members: &[&str],
    group: &BTreeMap<String, f64>,
) -> Result<Vec<f64>, AhpError> {
    if let Some(extra) = group.keys().find(|k| !members.contains(&k.as_str())) {
        return Err(AhpError::UnknownElement { id: extra.clone() });
    }
    let mut values = Vec::with_capacity(members.len());
    for member in members {
        let value = group.get(*member).ok_or_else(|| AhpError::MissingPriorities {
            node: format!("{} under {}", member, node),
        })?;
        values.push(*value);
    }
    normalize_non_negative(&mut values, &format!("local priorities under {}", node))?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ahp::{Criterion, PairwiseJudgment, PriorityMethod, PrioritySolver};

    fn tree() -> CriteriaTree {
        CriteriaTree::new(vec![
            Criterion::top_level("cost", "Cost"),
            Criterion::top_level("quality", "Quality"),
            Criterion::child_of("price", "Price", "cost"),
            Criterion::child_of("upkeep", "Upkeep", "cost"),
        ])
        .unwrap()
    }

    fn alternatives() -> Vec<Alternative> {
        vec![Alternative::new("x", "X"), Alternative::new("y", "Y")]
    }

    fn local() -> LocalPriorities {
        LocalPriorities::new()
            .with_criteria(None, [("cost", 0.6), ("quality", 0.4)])
            .with_criteria(Some("cost"), [("price", 0.75), ("upkeep", 0.25)])
            .with_alternatives("price", [("x", 0.8), ("y", 0.2)])
            .with_alternatives("upkeep", [("x", 0.5), ("y", 0.5)])
            .with_alternatives("quality", [("x", 0.25), ("y", 0.75)])
    }

    fn weight_of<'a>(result: &'a HierarchyResult, id: &str) -> &'a CriterionWeight {
        result.criteria.iter().find(|c| c.criterion_id == id).unwrap()
    }

    // Global weights

    #[test]
    fn global_weight_is_local_times_parent() {
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local()).unwrap();
        assert!((weight_of(&result, "price").global_weight - 0.45).abs() < 1e-12);
        assert!((weight_of(&result, "upkeep").global_weight - 0.15).abs() < 1e-12);
        assert!((weight_of(&result, "quality").global_weight - 0.4).abs() < 1e-12);
        assert_eq!(weight_of(&result, "upkeep").level, 2);
        assert!(!weight_of(&result, "cost").is_leaf);
    }

    #[test]
    fn leaf_global_weights_sum_to_one() {
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local()).unwrap();
        let sum: f64 = result.leaf_global_weights().values().sum();
        assert!((sum - 1.0).abs() < SUM_TOLERANCE);
        assert_eq!(result.leaf_global_weights().len(), 3);
    }

    #[test]
    fn unnormalized_groups_are_rescaled() {
        let local = local().with_criteria(None, [("cost", 3.0), ("quality", 2.0)]);
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap();
        assert!((weight_of(&result, "cost").local_weight - 0.6).abs() < 1e-12);
    }

    // Scores

    #[test]
    fn distributive_scores_are_weighted_sums() {
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local()).unwrap();
        // x = 0.45*0.8 + 0.15*0.5 + 0.4*0.25 = 0.535
        let top = &result.distributive_scores[0];
        assert_eq!(top.alternative_id, "x");
        assert!((top.score - 0.535).abs() < 1e-12);
        assert_eq!(top.rank, 1);
        let sum: f64 = result.distributive_scores.iter().map(|s| s.score).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ideal_scores_divide_by_leaf_best_then_renormalize() {
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local()).unwrap();
        // x = 0.45*1 + 0.15*1 + 0.4*(1/3), y = 0.45*0.25 + 0.15*1 + 0.4*1
        let x = 0.45 + 0.15 + 0.4 / 3.0;
        let y = 0.45 * 0.25 + 0.15 + 0.4;
        let ideal = result.scores(ScoringMode::Ideal);
        assert_eq!(ideal[0].alternative_id, "x");
        assert!((ideal[0].score - x / (x + y)).abs() < 1e-12);
        let sum: f64 = ideal.iter().map(|s| s.score).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn accepts_solver_output() {
        let solver = PrioritySolver::default();
        let ids: Vec<String> = vec!["cost".into(), "quality".into()];
        let matrix = crate::domain::ahp::ComparisonMatrix::build(
            &ids,
            &[PairwiseJudgment::new("cost", "quality", 3.0)],
        )
        .unwrap();
        let top = solver.solve(&matrix, PriorityMethod::GeometricMean).unwrap();
        let local = local().with_criteria_result(None, &top);
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap();
        assert!((weight_of(&result, "cost").global_weight - 0.75).abs() < 1e-12);
    }

    #[test]
    fn decision_model_matches_distributive_ranking() {
        let result = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local()).unwrap();
        let model = result.decision_model().unwrap();
        for (a, b) in model.baseline_ranking().iter().zip(&result.distributive_scores) {
            assert_eq!(a.alternative_id, b.alternative_id);
            assert!((a.score - b.score).abs() < 1e-12);
        }
    }

    // Failures

    #[test]
    fn missing_group_is_reported() {
        let local = LocalPriorities::new()
            .with_criteria(None, [("cost", 0.6), ("quality", 0.4)])
            .with_alternatives("price", [("x", 0.8), ("y", 0.2)]);
        let err = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap_err();
        assert_eq!(err, AhpError::MissingPriorities { node: "cost".to_string() });
    }

    #[test]
    fn missing_leaf_priorities_are_reported() {
        let mut local = local();
        local.alternatives.remove("quality");
        let err = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap_err();
        assert_eq!(err, AhpError::MissingPriorities { node: "quality".to_string() });
    }

    #[test]
    fn group_with_foreign_member_is_rejected() {
        let local = local().with_criteria(Some("cost"), [("price", 0.5), ("quality", 0.5)]);
        let err = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap_err();
        assert!(matches!(err, AhpError::UnknownElement { .. }));
    }

    #[test]
    fn alternatives_under_parent_criterion_are_rejected() {
        let local = local().with_alternatives("cost", [("x", 0.5), ("y", 0.5)]);
        let err = HierarchicalAggregator::aggregate(&tree(), &alternatives(), &local).unwrap_err();
        assert!(matches!(err, AhpError::InvalidHierarchy { .. }));
    }

    #[test]
    fn duplicate_alternatives_are_rejected() {
        let alternatives = vec![Alternative::new("x", "X"), Alternative::new("x", "X2")];
        let err = HierarchicalAggregator::aggregate(&tree(), &alternatives, &local()).unwrap_err();
        assert!(matches!(err, AhpError::DuplicateElement { .. }));
    }
}
