//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to the outside world:
//! - `cache` - In-memory priority cache with single-flight computation
//! - `http` - Axum REST endpoints for the analyses

pub mod cache;
pub mod http;

pub use cache::InMemoryPriorityCache;
pub use http::{analysis_router, AnalysisAppState};
