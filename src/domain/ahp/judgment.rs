//! Pairwise judgments on the Saaty 1-9 ratio scale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::AhpError;

/// Largest admissible judgment ("extremely more important").
pub const SCALE_MAX: f64 = 9.0;

/// Smallest admissible judgment, the reciprocal of [`SCALE_MAX`].
pub const SCALE_MIN: f64 = 1.0 / 9.0;

/// Slack on the scale bounds so that `1/9` typed as a decimal is accepted.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Relative tolerance when deciding whether two statements of a pair agree.
const AGREEMENT_TOLERANCE: f64 = 1e-9;

/// "`left_id` is `value` times more important/preferred than `right_id`."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseJudgment {
    pub left_id: String,
    pub right_id: String,
    pub value: f64,
}

impl PairwiseJudgment {
    /// Creates a new judgment.
    pub fn new(left_id: impl Into<String>, right_id: impl Into<String>, value: f64) -> Self {
        Self {
            left_id: left_id.into(),
            right_id: right_id.into(),
            value,
        }
    }

    /// Checks the value against the scale.
    ///
    /// A self-comparison is only admissible with value 1.
    pub fn validate(&self) -> Result<(), AhpError> {
        let in_scale = self.value.is_finite()
            && self.value >= SCALE_MIN - SCALE_TOLERANCE
            && self.value <= SCALE_MAX + SCALE_TOLERANCE;
        let self_pair_ok = self.left_id != self.right_id || agrees(self.value, 1.0);

        if !in_scale || !self_pair_ok {
            return Err(AhpError::InvalidJudgment {
                left: self.left_id.clone(),
                right: self.right_id.clone(),
                value: self.value,
            });
        }
        Ok(())
    }

    /// Returns the value oriented as `left` vs `right`, if this judgment
    /// concerns that unordered pair.
    pub fn oriented(&self, left: &str, right: &str) -> Option<f64> {
        if self.left_id == left && self.right_id == right {
            Some(self.value)
        } else if self.left_id == right && self.right_id == left {
            Some(1.0 / self.value)
        } else {
            None
        }
    }

    /// Returns true for a comparison of an element with itself.
    pub fn is_self_comparison(&self) -> bool {
        self.left_id == self.right_id
    }

    /// Canonical key of the unordered pair.
    fn pair_key(&self) -> (String, String) {
        if self.left_id <= self.right_id {
            (self.left_id.clone(), self.right_id.clone())
        } else {
            (self.right_id.clone(), self.left_id.clone())
        }
    }
}

fn agrees(a: f64, b: f64) -> bool {
    (a - b).abs() <= AGREEMENT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// A validated collection holding at most one judgment per unordered pair.
///
/// The reciprocal of a stored judgment is implied, never stored. Restating a
/// pair consistently (same value, or the reversed pair with the reciprocal
/// value) is a no-op; restating it with a different value is rejected by
/// [`JudgmentSet::insert`] and must go through [`JudgmentSet::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JudgmentSet {
    judgments: Vec<PairwiseJudgment>,
    index: HashMap<(String, String), usize>,
}

impl JudgmentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a list, rejecting invalid values and conflicting duplicates.
    pub fn from_judgments<I>(judgments: I) -> Result<Self, AhpError>
    where
        I: IntoIterator<Item = PairwiseJudgment>,
    {
        let mut set = Self::new();
        for judgment in judgments {
            set.insert(judgment)?;
        }
        Ok(set)
    }

    /// Adds a judgment.
    ///
    /// # Errors
    /// - `InvalidJudgment` if the value is off-scale
    /// - `DuplicateJudgment` if the pair already holds a different value
    pub fn insert(&mut self, judgment: PairwiseJudgment) -> Result<(), AhpError> {
        judgment.validate()?;
        if judgment.is_self_comparison() {
            return Ok(());
        }

        let key = judgment.pair_key();
        if let Some(&idx) = self.index.get(&key) {
            let existing = &self.judgments[idx];
            let incoming = judgment
                .oriented(&existing.left_id, &existing.right_id)
                .unwrap_or(judgment.value);
            if agrees(existing.value, incoming) {
                return Ok(());
            }
            return Err(AhpError::DuplicateJudgment {
                left: existing.left_id.clone(),
                right: existing.right_id.clone(),
                existing: existing.value,
                incoming,
            });
        }

        self.index.insert(key, self.judgments.len());
        self.judgments.push(judgment);
        Ok(())
    }

    /// Replaces the judgment for a pair, returning the previous value oriented
    /// the way the new judgment is stated.
    pub fn update(&mut self, judgment: PairwiseJudgment) -> Result<Option<f64>, AhpError> {
        judgment.validate()?;
        if judgment.is_self_comparison() {
            return Ok(None);
        }

        let key = judgment.pair_key();
        match self.index.get(&key) {
            Some(&idx) => {
                let previous = self.judgments[idx].oriented(&judgment.left_id, &judgment.right_id);
                self.judgments[idx] = judgment;
                Ok(previous)
            }
            None => {
                self.index.insert(key, self.judgments.len());
                self.judgments.push(judgment);
                Ok(None)
            }
        }
    }

    /// Returns the value of `left` vs `right` if that pair was judged.
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let key = if left <= right {
            (left.to_string(), right.to_string())
        } else {
            (right.to_string(), left.to_string())
        };
        self.index
            .get(&key)
            .and_then(|&idx| self.judgments[idx].oriented(left, right))
    }

    /// Iterates stored judgments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PairwiseJudgment> {
        self.judgments.iter()
    }

    /// Number of judged pairs.
    pub fn len(&self) -> usize {
        self.judgments.len()
    }

    /// Returns true if no pair has been judged.
    pub fn is_empty(&self) -> bool {
        self.judgments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Validation

    #[test]
    fn validate_accepts_scale_bounds() {
        assert!(PairwiseJudgment::new("A", "B", 9.0).validate().is_ok());
        assert!(PairwiseJudgment::new("A", "B", 1.0 / 9.0).validate().is_ok());
        assert!(PairwiseJudgment::new("A", "B", 0.111111111111).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_negative_and_off_scale() {
        for value in [0.0, -3.0, 9.5, 0.1, f64::NAN, f64::INFINITY] {
            let result = PairwiseJudgment::new("A", "B", value).validate();
            assert!(
                matches!(result, Err(AhpError::InvalidJudgment { .. })),
                "value {} should be rejected",
                value
            );
        }
    }

    #[test]
    fn validate_rejects_self_comparison_other_than_one() {
        assert!(PairwiseJudgment::new("A", "A", 1.0).validate().is_ok());
        assert!(PairwiseJudgment::new("A", "A", 3.0).validate().is_err());
    }

    #[test]
    fn oriented_returns_reciprocal_for_reversed_pair() {
        let j = PairwiseJudgment::new("A", "B", 4.0);
        assert_eq!(j.oriented("A", "B"), Some(4.0));
        assert_eq!(j.oriented("B", "A"), Some(0.25));
        assert_eq!(j.oriented("A", "C"), None);
    }

    // JudgmentSet

    #[test]
    fn insert_accepts_consistent_restatement() {
        let mut set = JudgmentSet::new();
        set.insert(PairwiseJudgment::new("A", "B", 3.0)).unwrap();
        set.insert(PairwiseJudgment::new("A", "B", 3.0)).unwrap();
        set.insert(PairwiseJudgment::new("B", "A", 1.0 / 3.0)).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_rejects_conflicting_duplicate() {
        let mut set = JudgmentSet::new();
        set.insert(PairwiseJudgment::new("A", "B", 3.0)).unwrap();
        let err = set.insert(PairwiseJudgment::new("B", "A", 3.0)).unwrap_err();
        match err {
            AhpError::DuplicateJudgment { existing, incoming, .. } => {
                assert_eq!(existing, 3.0);
                assert!((incoming - 1.0 / 3.0).abs() < 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(set.get("A", "B"), Some(3.0));
    }

    #[test]
    fn update_replaces_and_returns_previous() {
        let mut set = JudgmentSet::new();
        set.insert(PairwiseJudgment::new("A", "B", 3.0)).unwrap();
        let previous = set.update(PairwiseJudgment::new("B", "A", 5.0)).unwrap();
        assert!((previous.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(set.get("B", "A"), Some(5.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn update_of_new_pair_inserts() {
        let mut set = JudgmentSet::new();
        assert_eq!(set.update(PairwiseJudgment::new("A", "C", 2.0)).unwrap(), None);
        assert_eq!(set.get("C", "A"), Some(0.5));
    }

    #[test]
    fn self_comparison_is_not_stored() {
        let set = JudgmentSet::from_judgments(vec![PairwiseJudgment::new("A", "A", 1.0)]).unwrap();
        assert!(set.is_empty());
    }
}
