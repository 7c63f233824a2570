//! Comparison Matrix - reciprocal pairwise-comparison matrix built from judgments.

use std::collections::HashSet;

use super::judgment::{JudgmentSet, PairwiseJudgment, SCALE_MAX, SCALE_MIN};
use super::AhpError;

/// Square reciprocal matrix over an ordered element list.
///
/// `M[i][i] = 1` and `M[j][i] = 1 / M[i][j]` hold by construction. Pairs no
/// judgment covers are left empty and the matrix reports itself incomplete.
/// A matrix is never mutated; new judgments mean a new matrix.
#[derive(Debug, Clone)]
pub struct ComparisonMatrix {
    elements: Vec<String>,
    /// Row-major entries; NaN marks a missing pair.
    values: Vec<f64>,
    missing_pairs: usize,
    estimated_pairs: usize,
}

impl ComparisonMatrix {
    /// Builds a matrix from raw judgments.
    ///
    /// # Errors
    /// - `DegenerateMatrix` for an empty element list
    /// - `DuplicateElement` if an id is listed twice
    /// - `InvalidJudgment` for off-scale values
    /// - `DuplicateJudgment` for two different values on one pair
    /// - `UnknownElement` for judgments about ids outside `elements`
    pub fn build(elements: &[String], judgments: &[PairwiseJudgment]) -> Result<Self, AhpError> {
        let set = JudgmentSet::from_judgments(judgments.iter().cloned())?;
        Self::from_judgment_set(elements, &set)
    }

    /// Builds a matrix from an already validated judgment set.
    pub fn from_judgment_set(elements: &[String], set: &JudgmentSet) -> Result<Self, AhpError> {
        validate_elements(elements)?;

        let known: HashSet<&str> = elements.iter().map(String::as_str).collect();
        for judgment in set.iter() {
            for id in [&judgment.left_id, &judgment.right_id] {
                if !known.contains(id.as_str()) {
                    return Err(AhpError::UnknownElement { id: id.clone() });
                }
            }
        }

        Ok(Self::assemble(elements.to_vec(), |i, j| {
            set.get(&elements[i], &elements[j])
        }))
    }

    /// Builds a matrix from full rows as a UI grid would submit them.
    ///
    /// `None` marks an unanswered cell. The diagonal must be 1 and each lower
    /// cell, when present, must be the reciprocal of its upper cell.
    pub fn from_rows(elements: &[String], rows: &[Vec<Option<f64>>]) -> Result<Self, AhpError> {
        validate_elements(elements)?;
        let n = elements.len();
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(AhpError::degenerate(format!(
                "matrix must be {n}x{n} to match the element list"
            )));
        }

        let mut set = JudgmentSet::new();
        for (i, row) in rows.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if let Some(value) = cell {
                    set.insert(PairwiseJudgment::new(
                        elements[i].clone(),
                        elements[j].clone(),
                        *value,
                    ))?;
                }
            }
        }
        Self::from_judgment_set(elements, &set)
    }

    /// Assembles a matrix from an upper-triangle source; the lower triangle is
    /// always derived as the exact reciprocal.
    pub(crate) fn assemble<F>(elements: Vec<String>, upper: F) -> Self
    where
        F: Fn(usize, usize) -> Option<f64>,
    {
        let n = elements.len();
        let mut values = vec![f64::NAN; n * n];
        let mut missing_pairs = 0;

        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                match upper(i, j) {
                    Some(value) => {
                        let (upper, lower) = reciprocal_pair(value);
                        values[i * n + j] = upper;
                        values[j * n + i] = lower;
                    }
                    None => missing_pairs += 1,
                }
            }
        }

        Self {
            elements,
            values,
            missing_pairs,
            estimated_pairs: 0,
        }
    }

    /// Returns the matrix dimension.
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Returns the ordered element ids.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Returns the position of an element.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e == id)
    }

    /// Returns `M[i][j]`, or None if the pair is missing or out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.size();
        if i >= n || j >= n {
            return None;
        }
        let value = self.values[i * n + j];
        (!value.is_nan()).then_some(value)
    }

    /// Returns the entry for a pair of element ids.
    pub fn get_by_id(&self, left: &str, right: &str) -> Option<f64> {
        self.get(self.index_of(left)?, self.index_of(right)?)
    }

    /// Returns true when every pair is judged or estimated.
    pub fn is_complete(&self) -> bool {
        self.missing_pairs == 0
    }

    /// Number of unordered pairs without a value.
    pub fn missing_pairs(&self) -> usize {
        self.missing_pairs
    }

    /// Number of unordered pairs filled by transitive estimation.
    pub fn estimated_pairs(&self) -> usize {
        self.estimated_pairs
    }

    /// Returns the matrix as rows, `None` for missing cells.
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        let n = self.size();
        (0..n)
            .map(|i| (0..n).map(|j| self.get(i, j)).collect())
            .collect()
    }

    /// Returns row `i` of a complete matrix.
    pub(crate) fn row(&self, i: usize) -> &[f64] {
        let n = self.size();
        &self.values[i * n..(i + 1) * n]
    }

    /// Returns a new matrix whose gaps are estimated through intermediate elements.
    ///
    /// Each missing `M[i][k]` becomes the geometric mean of every available
    /// `M[i][j] * M[j][k]`, clamped to the judgment scale. Passes repeat until
    /// nothing more can be estimated, so multi-step paths are reached too.
    ///
    /// # Errors
    /// `IncompleteMatrix` if some pair is unreachable through known judgments.
    pub fn fill_gaps(&self) -> Result<Self, AhpError> {
        if self.is_complete() {
            return Ok(self.clone());
        }

        let n = self.size();
        let mut values = self.values.clone();
        let mut estimated = 0;

        loop {
            let snapshot = values.clone();
            let mut progressed = false;

            for i in 0..n {
                for k in (i + 1)..n {
                    if !snapshot[i * n + k].is_nan() {
                        continue;
                    }

                    let mut log_sum = 0.0;
                    let mut paths = 0usize;
                    for j in 0..n {
                        if j == i || j == k {
                            continue;
                        }
                        let (a, b) = (snapshot[i * n + j], snapshot[j * n + k]);
                        if a.is_nan() || b.is_nan() {
                            continue;
                        }
                        log_sum += a.ln() + b.ln();
                        paths += 1;
                    }

                    if paths > 0 {
                        let estimate = (log_sum / paths as f64).exp().clamp(SCALE_MIN, SCALE_MAX);
                        let (upper, lower) = reciprocal_pair(estimate);
                        values[i * n + k] = upper;
                        values[k * n + i] = lower;
                        estimated += 1;
                        progressed = true;
                    }
                }
            }

            if !progressed {
                break;
            }
        }

        let still_missing = self.missing_pairs - estimated;
        if still_missing > 0 {
            return Err(AhpError::IncompleteMatrix {
                missing_pairs: still_missing,
            });
        }

        Ok(Self {
            elements: self.elements.clone(),
            values,
            missing_pairs: 0,
            estimated_pairs: self.estimated_pairs + estimated,
        })
    }
}

/// Largest distance, in ulps, searched for an exactly reciprocal value.
const RECIPROCAL_SEARCH_ULPS: u64 = 64;

/// Returns `(v, 1 / v)` with `v` moved to the nearest `f64` whose product
/// with its reciprocal is exactly 1.
///
/// Most values already qualify. The rest sit a few ulps from one that does,
/// far below any meaningful judgment precision.
pub(crate) fn reciprocal_pair(value: f64) -> (f64, f64) {
    if !value.is_finite() || value <= 0.0 {
        return (value, 1.0 / value);
    }
    let bits = value.to_bits();
    for step in 0..=RECIPROCAL_SEARCH_ULPS {
        for candidate in [bits.wrapping_add(step), bits.wrapping_sub(step)] {
            let v = f64::from_bits(candidate);
            let r = 1.0 / v;
            if v.is_finite() && v > 0.0 && v * r == 1.0 {
                return (v, r);
            }
        }
    }
    (value, 1.0 / value)
}

fn validate_elements(elements: &[String]) -> Result<(), AhpError> {
    if elements.is_empty() {
        return Err(AhpError::degenerate("comparison needs at least one element"));
    }
    let mut seen = HashSet::with_capacity(elements.len());
    for id in elements {
        if id.trim().is_empty() {
            return Err(AhpError::degenerate("element ids cannot be blank"));
        }
        if !seen.insert(id.as_str()) {
            return Err(AhpError::DuplicateElement { id: id.clone() });
        }
    }
    Ok(())
}
