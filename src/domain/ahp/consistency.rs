//! Consistency Checker - Consistency Index/Ratio and acceptability.

use serde::{Deserialize, Serialize};

/// Saaty's Random Index for matrix sizes 1 through 15.
pub const RANDOM_INDEX: [f64; 15] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

/// Conventional upper bound for an acceptable consistency ratio.
pub const CONSISTENCY_THRESHOLD: f64 = 0.10;

/// Outcome of a consistency check.
///
/// `acceptable` is advisory: an inconsistent matrix still yields priorities
/// and it is up to the caller whether to ask the evaluator for revisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub n: usize,
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub consistency_ratio: f64,
    pub random_index: f64,
    pub threshold: f64,
    pub acceptable: bool,
}

/// Computes CI and CR against a configurable threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyChecker {
    threshold: f64,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self {
            threshold: CONSISTENCY_THRESHOLD,
        }
    }
}

impl ConsistencyChecker {
    /// Creates a checker with a custom acceptability threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Returns the threshold in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns RI(n). Sizes above the table reuse its last entry.
    pub fn random_index(n: usize) -> f64 {
        match n {
            0 => 0.0,
            n if n <= RANDOM_INDEX.len() => RANDOM_INDEX[n - 1],
            _ => RANDOM_INDEX[RANDOM_INDEX.len() - 1],
        }
    }

    /// Computes `CI = (λmax - n) / (n - 1)` and `CR = CI / RI(n)`.
    ///
    /// # Edge Cases
    /// - `n <= 2`: always perfectly consistent (CR = 0)
    /// - λmax marginally below n from rounding: CI is clamped to 0
    pub fn check(&self, n: usize, lambda_max: f64) -> ConsistencyReport {
        if n <= 2 {
            return self.perfectly_consistent(n);
        }

        let consistency_index = ((lambda_max - n as f64) / (n as f64 - 1.0)).max(0.0);
        let random_index = Self::random_index(n);
        let consistency_ratio = consistency_index / random_index;

        ConsistencyReport {
            n,
            lambda_max,
            consistency_index,
            consistency_ratio,
            random_index,
            threshold: self.threshold,
            acceptable: consistency_ratio <= self.threshold,
        }
    }

    /// Report for matrices that cannot be inconsistent.
    pub fn perfectly_consistent(&self, n: usize) -> ConsistencyReport {
        ConsistencyReport {
            n,
            lambda_max: n as f64,
            consistency_index: 0.0,
            consistency_ratio: 0.0,
            random_index: Self::random_index(n),
            threshold: self.threshold,
            acceptable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_index_matches_table() {
        assert_eq!(ConsistencyChecker::random_index(1), 0.0);
        assert_eq!(ConsistencyChecker::random_index(3), 0.58);
        assert_eq!(ConsistencyChecker::random_index(12), 1.48);
        assert_eq!(ConsistencyChecker::random_index(15), 1.59);
    }

    #[test]
    fn random_index_beyond_table_uses_last_entry() {
        assert_eq!(ConsistencyChecker::random_index(20), 1.59);
    }

    #[test]
    fn small_matrices_are_perfectly_consistent() {
        let checker = ConsistencyChecker::default();
        for n in [1, 2] {
            let report = checker.check(n, 7.0);
            assert_eq!(report.consistency_ratio, 0.0);
            assert!(report.acceptable);
        }
    }

    #[test]
    fn check_computes_ci_and_cr() {
        let report = ConsistencyChecker::default().check(4, 4.27);
        assert!((report.consistency_index - 0.09).abs() < 1e-12);
        assert!((report.consistency_ratio - 0.1).abs() < 1e-12);
        assert!(report.acceptable);
    }

    #[test]
    fn check_flags_ratio_above_threshold() {
        let report = ConsistencyChecker::default().check(3, 3.2);
        assert!(report.consistency_ratio > CONSISTENCY_THRESHOLD);
        assert!(!report.acceptable);
    }

    #[test]
    fn custom_threshold_is_applied() {
        let report = ConsistencyChecker::new(0.2).check(3, 3.2);
        assert!(report.acceptable);
        assert_eq!(report.threshold, 0.2);
    }

    #[test]
    fn rounding_below_n_is_clamped() {
        let report = ConsistencyChecker::default().check(3, 3.0 - 1e-14);
        assert_eq!(report.consistency_index, 0.0);
        assert_eq!(report.consistency_ratio, 0.0);
    }
}
