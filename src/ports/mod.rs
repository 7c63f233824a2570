//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PriorityCache` - Content-addressed memo for solved comparison matrices

mod priority_cache;

pub use priority_cache::{CacheStats, MatrixFingerprint, PriorityCache};
