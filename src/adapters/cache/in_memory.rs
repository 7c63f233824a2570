//! In-memory priority cache with single-flight computation.
//!
//! Each key maps to a shared `OnceCell`. The first caller initializes it while
//! concurrent callers for the same key block on the cell and receive the same
//! result. Entries are evicted oldest-first once capacity is reached.

use once_cell::sync::OnceCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::domain::ahp::{AhpError, PriorityResult};
use crate::ports::{CacheStats, MatrixFingerprint, PriorityCache};

/// Bounded, process-local priority cache.
#[derive(Debug)]
pub struct InMemoryPriorityCache {
    capacity: usize,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<MatrixFingerprint, Arc<OnceCell<PriorityResult>>>,
    /// Insertion order for eviction.
    order: VecDeque<MatrixFingerprint>,
}

impl InMemoryPriorityCache {
    /// Creates a cache holding at most `capacity` results. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cell for `key`, creating it (and evicting) if needed.
    fn cell_for(&self, key: &MatrixFingerprint) -> Arc<OnceCell<PriorityResult>> {
        let mut state = self.lock();
        if let Some(cell) = state.entries.get(key) {
            return Arc::clone(cell);
        }

        let cell = Arc::new(OnceCell::new());
        state.entries.insert(key.clone(), Arc::clone(&cell));
        state.order.push_back(key.clone());
        while state.entries.len() > self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                    debug!(fingerprint = %oldest, "priority cache evicted entry");
                }
                None => break,
            }
        }
        cell
    }

    /// Removes an entry whose computation failed, unless it was replaced meanwhile.
    fn discard_failed(&self, key: &MatrixFingerprint, cell: &Arc<OnceCell<PriorityResult>>) {
        let mut state = self.lock();
        let same = state
            .entries
            .get(key)
            .map(|current| Arc::ptr_eq(current, cell) && current.get().is_none())
            .unwrap_or(false);
        if same {
            state.entries.remove(key);
            state.order.retain(|k| k != key);
        }
    }
}

impl PriorityCache for InMemoryPriorityCache {
    fn get_or_compute(
        &self,
        key: &MatrixFingerprint,
        compute: &dyn Fn() -> Result<PriorityResult, AhpError>,
    ) -> Result<PriorityResult, AhpError> {
        if self.capacity == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute();
        }

        let cell = self.cell_for(key);
        let mut computed = false;
        let outcome = cell
            .get_or_try_init(|| {
                computed = true;
                compute()
            })
            .map(Clone::clone);

        match &outcome {
            Ok(_) if computed => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(fingerprint = %key, "priority cache miss");
            }
            Ok(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(fingerprint = %key, "priority cache hit");
            }
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.discard_failed(key, &cell);
            }
        }
        outcome
    }

    fn invalidate(&self, key: &MatrixFingerprint) -> bool {
        let mut state = self.lock();
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.order.retain(|k| k != key);
        }
        removed
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ahp::{ComparisonMatrix, PairwiseJudgment, PriorityMethod, PrioritySolver};
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    fn matrix(ab: f64) -> ComparisonMatrix {
        ComparisonMatrix::build(
            &["A".to_string(), "B".to_string()],
            &[PairwiseJudgment::new("A", "B", ab)],
        )
        .unwrap()
    }

    fn key(ab: f64) -> MatrixFingerprint {
        MatrixFingerprint::compute(
            &matrix(ab),
            PriorityMethod::GeometricMean,
            &PrioritySolver::default(),
        )
    }

    fn solve(ab: f64) -> Result<PriorityResult, AhpError> {
        PrioritySolver::default().solve(&matrix(ab), PriorityMethod::GeometricMean)
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = InMemoryPriorityCache::new(8);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            solve(3.0)
        };

        let first = cache.get_or_compute(&key(3.0), &compute).unwrap();
        let second = cache.get_or_compute(&key(3.0), &compute).unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn concurrent_requests_compute_once() {
        let cache = Arc::new(InMemoryPriorityCache::new(8));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    let compute = || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        solve(5.0)
                    };
                    cache.get_or_compute(&key(5.0), &compute).unwrap()
                })
            })
            .collect();

        let results: Vec<PriorityResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.stats().hits, 7);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = InMemoryPriorityCache::new(8);
        let failing = || -> Result<PriorityResult, AhpError> { Err(AhpError::Cancelled) };
        assert!(cache.get_or_compute(&key(2.0), &failing).is_err());
        assert_eq!(cache.stats().entries, 0);

        let ok = cache.get_or_compute(&key(2.0), &|| solve(2.0));
        assert!(ok.is_ok());
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let cache = InMemoryPriorityCache::new(2);
        for ab in [2.0, 3.0, 4.0] {
            cache.get_or_compute(&key(ab), &|| solve(ab)).unwrap();
        }
        assert_eq!(cache.stats().entries, 2);
        assert!(!cache.invalidate(&key(2.0)));
        assert!(cache.invalidate(&key(4.0)));
    }

    #[test]
    fn zero_capacity_always_computes() {
        let cache = InMemoryPriorityCache::new(0);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            solve(3.0)
        };
        cache.get_or_compute(&key(3.0), &compute).unwrap();
        cache.get_or_compute(&key(3.0), &compute).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = InMemoryPriorityCache::new(4);
        cache.get_or_compute(&key(3.0), &|| solve(3.0)).unwrap();
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
