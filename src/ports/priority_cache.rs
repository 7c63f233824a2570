//! Priority cache port - memoized priority results keyed by matrix content.
//!
//! Keys are content fingerprints: changing any judgment changes the key, so a
//! stale entry can never be served for revised judgments.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::ahp::{
    AhpError, ComparisonMatrix, GapPolicy, PriorityMethod, PriorityResult, PrioritySolver,
};

/// Port for memoizing solved comparison matrices.
///
/// Implementations must compute each key at most once when several callers
/// ask for it concurrently; late callers wait for the in-flight result.
/// Failed computations are not cached.
pub trait PriorityCache: Send + Sync {
    /// Returns the cached result for `key`, or runs `compute` and caches it.
    fn get_or_compute(
        &self,
        key: &MatrixFingerprint,
        compute: &dyn Fn() -> Result<PriorityResult, AhpError>,
    ) -> Result<PriorityResult, AhpError>;

    /// Drops one entry. Returns true if it was present.
    fn invalidate(&self, key: &MatrixFingerprint) -> bool;

    /// Drops every entry.
    fn clear(&self);

    /// Current counters.
    fn stats(&self) -> CacheStats;
}

/// Cache counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// SHA-256 digest of everything that determines a priority result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixFingerprint(String);

impl MatrixFingerprint {
    /// Fingerprints a matrix together with the method and solver settings.
    pub fn compute(
        matrix: &ComparisonMatrix,
        method: PriorityMethod,
        solver: &PrioritySolver,
    ) -> Self {
        let mut hasher = Sha256::new();

        hasher.update((matrix.size() as u64).to_le_bytes());
        for element in matrix.elements() {
            hasher.update((element.len() as u64).to_le_bytes());
            hasher.update(element.as_bytes());
        }
        for row in matrix.rows() {
            for cell in row {
                match cell {
                    Some(value) => {
                        hasher.update([1u8]);
                        hasher.update(value.to_bits().to_le_bytes());
                    }
                    None => hasher.update([0u8]),
                }
            }
        }

        let method_tag: u8 = match method {
            PriorityMethod::GeometricMean => 0,
            PriorityMethod::Eigenvector => 1,
        };
        let gap_tag: u8 = match solver.config().gap_policy {
            GapPolicy::Reject => 0,
            GapPolicy::TransitiveEstimate => 1,
        };
        hasher.update([method_tag, gap_tag]);
        hasher.update(solver.config().tolerance.to_bits().to_le_bytes());
        hasher.update((solver.config().max_iterations as u64).to_le_bytes());
        hasher.update(solver.checker().threshold().to_bits().to_le_bytes());

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatrixFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
