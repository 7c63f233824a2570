//! Criteria hierarchy - validated arena of criteria with child adjacency.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::AhpError;

/// A decision criterion. Top-level criteria have no parent (they sit
/// directly under the goal) and are at level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Declared level; checked against the tree when present.
    #[serde(default)]
    pub level: Option<u32>,
}

impl Criterion {
    /// Creates a top-level criterion.
    pub fn top_level(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            level: None,
        }
    }

    /// Creates a sub-criterion.
    pub fn child_of(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
            level: None,
        }
    }
}

/// A decision alternative, scored against every leaf criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub name: String,
}

impl Alternative {
    /// Creates a new alternative.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Criteria indexed by position, with precomputed children and levels.
///
/// No node points back to its parent object; walks go through indices.
#[derive(Debug, Clone)]
pub struct CriteriaTree {
    nodes: Vec<Criterion>,
    index: HashMap<String, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    levels: Vec<u32>,
    /// Breadth-first order from the goal; parents precede children.
    order: Vec<usize>,
}

impl CriteriaTree {
    /// Validates and indexes a criteria list.
    ///
    /// # Errors
    /// - `InvalidHierarchy` for an empty list, an unknown parent, a cycle, or
    ///   a declared level that disagrees with the tree
    /// - `DuplicateElement` for a repeated id
    pub fn new(criteria: Vec<Criterion>) -> Result<Self, AhpError> {
        if criteria.is_empty() {
            return Err(AhpError::invalid_hierarchy("at least one criterion is required"));
        }

        let mut index = HashMap::with_capacity(criteria.len());
        for (idx, criterion) in criteria.iter().enumerate() {
            if criterion.id.trim().is_empty() {
                return Err(AhpError::invalid_hierarchy("criterion ids cannot be blank"));
            }
            if index.insert(criterion.id.clone(), idx).is_some() {
                return Err(AhpError::DuplicateElement {
                    id: criterion.id.clone(),
                });
            }
        }

        let mut parents = vec![None; criteria.len()];
        let mut children = vec![Vec::new(); criteria.len()];
        let mut roots = Vec::new();
        for (idx, criterion) in criteria.iter().enumerate() {
            match &criterion.parent_id {
                None => roots.push(idx),
                Some(parent_id) => {
                    let parent = *index.get(parent_id).ok_or_else(|| {
                        AhpError::invalid_hierarchy(format!(
                            "criterion {} refers to unknown parent {}",
                            criterion.id, parent_id
                        ))
                    })?;
                    parents[idx] = Some(parent);
                    children[parent].push(idx);
                }
            }
        }

        // Nodes unreachable from the goal can only sit on a parent cycle.
        let mut levels = vec![0u32; criteria.len()];
        let mut order = Vec::with_capacity(criteria.len());
        let mut queue: VecDeque<usize> = roots.iter().copied().collect();
        for &root in &roots {
            levels[root] = 1;
        }
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &child in &children[node] {
                levels[child] = levels[node] + 1;
                queue.push_back(child);
            }
        }
        if order.len() != criteria.len() {
            let cyclic: Vec<&str> = levels
                .iter()
                .enumerate()
                .filter(|(_, level)| **level == 0)
                .map(|(idx, _)| criteria[idx].id.as_str())
                .collect();
            return Err(AhpError::invalid_hierarchy(format!(
                "parent cycle through {}",
                cyclic.join(", ")
            )));
        }

        for (idx, criterion) in criteria.iter().enumerate() {
            if let Some(declared) = criterion.level {
                if declared != levels[idx] {
                    return Err(AhpError::invalid_hierarchy(format!(
                        "criterion {} declares level {} but sits at level {}",
                        criterion.id, declared, levels[idx]
                    )));
                }
            }
        }

        Ok(Self {
            nodes: criteria,
            index,
            parents,
            children,
            roots,
            levels,
            order,
        })
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a criterion.
    pub fn get(&self, id: &str) -> Option<&Criterion> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Ids of the criteria directly under the goal.
    pub fn roots(&self) -> Vec<&str> {
        self.roots.iter().map(|&idx| self.nodes[idx].id.as_str()).collect()
    }

    /// Ids of the children of `parent` (`None` is the goal), in input order.
    pub fn children_of(&self, parent: Option<&str>) -> Option<Vec<&str>> {
        let indices = match parent {
            None => &self.roots,
            Some(id) => &self.children[*self.index.get(id)?],
        };
        Some(indices.iter().map(|&idx| self.nodes[idx].id.as_str()).collect())
    }

    /// Parent id of a criterion; `None` for top-level criteria.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        let idx = *self.index.get(id)?;
        self.parents[idx].map(|p| self.nodes[p].id.as_str())
    }

    /// Level of a criterion (top level = 1).
    pub fn level_of(&self, id: &str) -> Option<u32> {
        self.index.get(id).map(|&idx| self.levels[idx])
    }

    /// Returns true if the criterion has no children.
    pub fn is_leaf(&self, id: &str) -> bool {
        self.index
            .get(id)
            .map(|&idx| self.children[idx].is_empty())
            .unwrap_or(false)
    }

    /// Leaf criteria in breadth-first order.
    pub fn leaves(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|&&idx| self.children[idx].is_empty())
            .map(|&idx| self.nodes[idx].id.as_str())
            .collect()
    }

    /// Criteria ids in breadth-first order; every parent precedes its children.
    pub fn top_down(&self) -> Vec<&str> {
        self.order.iter().map(|&idx| self.nodes[idx].id.as_str()).collect()
    }

    /// Every group of siblings that needs its own comparison matrix:
    /// the goal's children first, then each non-leaf criterion's children.
    pub fn sibling_groups(&self) -> Vec<(Option<&str>, Vec<&str>)> {
        let mut groups = Vec::new();
        groups.push((None, self.roots()));
        for &idx in &self.order {
            if !self.children[idx].is_empty() {
                let id = self.nodes[idx].id.as_str();
                groups.push((
                    Some(id),
                    self.children[idx]
                        .iter()
                        .map(|&c| self.nodes[c].id.as_str())
                        .collect(),
                ));
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Criterion> {
        vec![
            Criterion::top_level("cost", "Cost"),
            Criterion::top_level("quality", "Quality"),
            Criterion::child_of("price", "Purchase price", "cost"),
            Criterion::child_of("upkeep", "Upkeep", "cost"),
            Criterion::child_of("comfort", "Comfort", "quality"),
        ]
    }

    #[test]
    fn builds_levels_and_children() {
        let tree = CriteriaTree::new(sample()).unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.roots(), vec!["cost", "quality"]);
        assert_eq!(tree.children_of(Some("cost")).unwrap(), vec!["price", "upkeep"]);
        assert_eq!(tree.children_of(None).unwrap(), vec!["cost", "quality"]);
        assert_eq!(tree.level_of("cost"), Some(1));
        assert_eq!(tree.level_of("upkeep"), Some(2));
        assert_eq!(tree.parent_of("comfort"), Some("quality"));
        assert_eq!(tree.parent_of("cost"), None);
    }

    #[test]
    fn leaves_exclude_parents() {
        let tree = CriteriaTree::new(sample()).unwrap();
        assert_eq!(tree.leaves(), vec!["price", "upkeep", "comfort"]);
        assert!(tree.is_leaf("price"));
        assert!(!tree.is_leaf("cost"));
    }

    #[test]
    fn top_down_lists_parents_first() {
        let tree = CriteriaTree::new(sample()).unwrap();
        let order = tree.top_down();
        let pos = |id: &str| order.iter().position(|x| *x == id).unwrap();
        assert!(pos("cost") < pos("price"));
        assert!(pos("quality") < pos("comfort"));
    }

    #[test]
    fn sibling_groups_cover_goal_and_parents() {
        let tree = CriteriaTree::new(sample()).unwrap();
        let groups = tree.sibling_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], (None, vec!["cost", "quality"]));
        assert!(groups.contains(&(Some("quality"), vec!["comfort"])));
    }

    #[test]
    fn rejects_unknown_parent() {
        let result = CriteriaTree::new(vec![Criterion::child_of("a", "A", "ghost")]);
        assert!(matches!(result, Err(AhpError::InvalidHierarchy { .. })));
    }

    #[test]
    fn rejects_cycle() {
        let result = CriteriaTree::new(vec![
            Criterion::top_level("root", "Root"),
            Criterion::child_of("a", "A", "b"),
            Criterion::child_of("b", "B", "a"),
        ]);
        match result {
            Err(AhpError::InvalidHierarchy { reason }) => {
                assert!(reason.contains("cycle"));
                assert!(reason.contains('a') && reason.contains('b'));
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_self_parent() {
        let result = CriteriaTree::new(vec![
            Criterion::top_level("root", "Root"),
            Criterion::child_of("loop", "Loop", "loop"),
        ]);
        assert!(matches!(result, Err(AhpError::InvalidHierarchy { .. })));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = CriteriaTree::new(vec![
            Criterion::top_level("a", "A"),
            Criterion::top_level("a", "Again"),
        ]);
        assert!(matches!(result, Err(AhpError::DuplicateElement { .. })));
    }

    #[test]
    fn rejects_mismatched_declared_level() {
        let mut criteria = sample();
        criteria[2].level = Some(3);
        let result = CriteriaTree::new(criteria);
        assert!(matches!(result, Err(AhpError::InvalidHierarchy { .. })));
    }

    #[test]
    fn rejects_empty_list() {
        assert!(CriteriaTree::new(vec![]).is_err());
    }
}
