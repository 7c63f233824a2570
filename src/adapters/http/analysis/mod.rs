//! HTTP adapter for the analysis module.
//!
//! This module exposes the AHP engine via REST endpoints.
//!
//! # Endpoints
//!
//! - `POST /analysis/calculate/individual/` - Solve one comparison matrix
//! - `POST /analysis/calculate/group/` - Aggregate evaluators
//! - `POST /analysis/calculate/hierarchy/` - Synthesize a criteria hierarchy
//! - `POST /analysis/advanced/{project}/sensitivity_analysis/` - Weight sweeps
//! - `POST /analysis/advanced/{project}/monte_carlo_simulation/` - Stability simulation
//! - `GET /health` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use handlers::{AnalysisApiError, AnalysisAppState};
pub use routes::analysis_router;
