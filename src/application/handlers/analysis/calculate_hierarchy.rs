//! CalculateHierarchyHandler - global weights and alternative scores for a project.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ahp::{
    AhpError, Alternative, ComparisonMatrix, CriteriaTree, Criterion, DerivationMethod,
    HierarchicalAggregator, HierarchyResult, LocalPriorities, PairwiseJudgment, PriorityMethod,
    PriorityResult,
};
use crate::domain::foundation::DomainError;

use super::CalculateIndividualHandler;

/// Local priorities of one group, given directly or as judgments to solve.
#[derive(Debug, Clone)]
pub enum PriorityInput {
    Weights(BTreeMap<String, f64>),
    Judgments(Vec<PairwiseJudgment>),
}

/// Priorities among the children of `parent_id` (`None` for the goal).
#[derive(Debug, Clone)]
pub struct CriteriaPriorities {
    pub parent_id: Option<String>,
    pub input: PriorityInput,
}

/// Priorities among the alternatives under one leaf criterion.
#[derive(Debug, Clone)]
pub struct AlternativePriorities {
    pub criterion_id: String,
    pub input: PriorityInput,
}

/// Command to synthesize a full hierarchy.
#[derive(Debug, Clone)]
pub struct CalculateHierarchyCommand {
    pub criteria: Vec<Criterion>,
    pub alternatives: Vec<Alternative>,
    pub criteria_priorities: Vec<CriteriaPriorities>,
    pub alternative_priorities: Vec<AlternativePriorities>,
    pub method: Option<PriorityMethod>,
    pub fill_gaps: bool,
}

/// Consistency of a group that was solved from judgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConsistency {
    /// Parent criterion id, `goal`, or the leaf id for alternative groups.
    pub node_id: String,
    pub consistency_ratio: f64,
    pub acceptable: bool,
    pub method: DerivationMethod,
}

/// Hierarchy synthesis with per-node consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyOutcome {
    pub result: HierarchyResult,
    pub node_consistency: Vec<NodeConsistency>,
}

/// Handler for hierarchical synthesis.
pub struct CalculateHierarchyHandler {
    individual: Arc<CalculateIndividualHandler>,
}

impl CalculateHierarchyHandler {
    pub fn new(individual: Arc<CalculateIndividualHandler>) -> Self {
        Self { individual }
    }

    pub fn handle(&self, cmd: CalculateHierarchyCommand) -> Result<HierarchyOutcome, DomainError> {
        let tree = CriteriaTree::new(cmd.criteria)?;
        let method = cmd.method.unwrap_or(self.individual.default_method());
        let mut local = LocalPriorities::new();
        let mut node_consistency = Vec::new();

        for group in cmd.criteria_priorities {
            let parent = group.parent_id.as_deref();
            let node_id = parent.unwrap_or("goal").to_string();
            local = match group.input {
                PriorityInput::Weights(weights) => local.with_criteria(parent, weights),
                PriorityInput::Judgments(judgments) => {
                    let children: Vec<String> = tree
                        .children_of(parent)
                        .ok_or_else(|| AhpError::UnknownElement {
                            id: node_id.clone(),
                        })?
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    if children.is_empty() {
                        return Err(AhpError::invalid_hierarchy(format!(
                            "criterion {} has no children to compare",
                            node_id
                        ))
                        .into());
                    }
                    let result = self.solve(&children, &judgments, method, cmd.fill_gaps)?;
                    node_consistency.push(consistency_of(node_id, &result));
                    local.with_criteria_result(parent, &result)
                }
            };
        }

        let alternative_ids: Vec<String> = cmd.alternatives.iter().map(|a| a.id.clone()).collect();
        for group in cmd.alternative_priorities {
            local = match group.input {
                PriorityInput::Weights(weights) => {
                    local.with_alternatives(&group.criterion_id, weights)
                }
                PriorityInput::Judgments(judgments) => {
                    let result = self.solve(&alternative_ids, &judgments, method, cmd.fill_gaps)?;
                    node_consistency.push(consistency_of(group.criterion_id.clone(), &result));
                    local.with_alternatives_result(&group.criterion_id, &result)
                }
            };
        }

        let result = HierarchicalAggregator::aggregate(&tree, &cmd.alternatives, &local)?;

        info!(
            criteria = tree.len(),
            alternatives = cmd.alternatives.len(),
            solved_nodes = node_consistency.len(),
            top_alternative = result
                .distributive_scores
                .first()
                .map(|s| s.alternative_id.as_str())
                .unwrap_or(""),
            "hierarchy synthesized"
        );

        Ok(HierarchyOutcome {
            result,
            node_consistency,
        })
    }

    fn solve(
        &self,
        elements: &[String],
        judgments: &[PairwiseJudgment],
        method: PriorityMethod,
        fill_gaps: bool,
    ) -> Result<PriorityResult, DomainError> {
        let matrix = ComparisonMatrix::build(elements, judgments)?;
        self.individual.solve_matrix(&matrix, method, fill_gaps)
    }
}

fn consistency_of(node_id: String, result: &PriorityResult) -> NodeConsistency {
    NodeConsistency {
        node_id,
        consistency_ratio: result.consistency_ratio,
        acceptable: result.is_consistent(),
        method: result.method,
    }
}
