//! HTTP handlers for analysis endpoints.
//!
//! Every analysis is CPU-bound, so handlers move the work onto a blocking
//! thread and keep the runtime free for other requests.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::cache::InMemoryPriorityCache;
use crate::application::handlers::{
    CalculateGroupHandler, CalculateHierarchyHandler, CalculateIndividualHandler,
    MonteCarloSimulationHandler, SensitivityAnalysisHandler,
};
use crate::config::EngineConfig;
use crate::domain::foundation::{DomainError, ErrorCode, ProjectId};
use crate::ports::PriorityCache;

use super::dto::{
    CalculateGroupRequest, CalculateHierarchyRequest, CalculateIndividualRequest, ErrorResponse,
    HealthResponse, MonteCarloSimulationRequest, SensitivityAnalysisRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct AnalysisAppState {
    pub individual: Arc<CalculateIndividualHandler>,
    pub group: Arc<CalculateGroupHandler>,
    pub hierarchy: Arc<CalculateHierarchyHandler>,
    pub sensitivity: Arc<SensitivityAnalysisHandler>,
    pub monte_carlo: Arc<MonteCarloSimulationHandler>,
    /// Group consistency gate unless a request overrides it.
    pub consistency_threshold: f64,
}

impl AnalysisAppState {
    /// Wires every handler from engine settings around the given cache.
    pub fn new(engine: &EngineConfig, cache: Arc<dyn PriorityCache>) -> Result<Self, DomainError> {
        let individual = Arc::new(CalculateIndividualHandler::new(
            engine.solver(),
            engine.default_method,
            cache,
        ));
        Ok(Self {
            group: Arc::new(CalculateGroupHandler::new(individual.clone())),
            hierarchy: Arc::new(CalculateHierarchyHandler::new(individual.clone())),
            sensitivity: Arc::new(SensitivityAnalysisHandler::new(engine.sensitivity_analyzer()?)),
            monte_carlo: Arc::new(MonteCarloSimulationHandler::new(
                engine.monte_carlo_simulator(),
                engine.default_simulations,
            )),
            individual,
            consistency_threshold: engine.consistency_threshold,
        })
    }

    /// Same as [`AnalysisAppState::new`] with an in-memory cache sized from config.
    pub fn from_config(engine: &EngineConfig) -> Result<Self, DomainError> {
        Self::new(
            engine,
            Arc::new(InMemoryPriorityCache::new(engine.cache_capacity)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /analysis/calculate/individual/ - Priorities and consistency for one matrix
pub async fn calculate_individual(
    State(state): State<AnalysisAppState>,
    Json(request): Json<CalculateIndividualRequest>,
) -> Result<impl IntoResponse, AnalysisApiError> {
    let cmd = request.into_command()?;
    let handler = state.individual.clone();
    let result = run_blocking(move || handler.handle(cmd)).await?;
    Ok(Json(result))
}

/// POST /analysis/calculate/group/ - Aggregate several evaluators
pub async fn calculate_group(
    State(state): State<AnalysisAppState>,
    Json(request): Json<CalculateGroupRequest>,
) -> Result<impl IntoResponse, AnalysisApiError> {
    let cmd = request.into_command(state.consistency_threshold)?;
    let handler = state.group.clone();
    let result = run_blocking(move || handler.handle(cmd)).await?;
    Ok(Json(result))
}

/// POST /analysis/calculate/hierarchy/ - Global weights and alternative scores
pub async fn calculate_hierarchy(
    State(state): State<AnalysisAppState>,
    Json(request): Json<CalculateHierarchyRequest>,
) -> Result<impl IntoResponse, AnalysisApiError> {
    let cmd = request.into_command()?;
    let handler = state.hierarchy.clone();
    let result = run_blocking(move || handler.handle(cmd)).await?;
    Ok(Json(result))
}

/// POST /analysis/advanced/:project/sensitivity_analysis/ - Weight sweeps
pub async fn sensitivity_analysis(
    State(state): State<AnalysisAppState>,
    Path(project): Path<String>,
    Json(request): Json<SensitivityAnalysisRequest>,
) -> Result<impl IntoResponse, AnalysisApiError> {
    let project_id = ProjectId::new(project).map_err(DomainError::from)?;
    let cmd = request.into_command(project_id);
    let handler = state.sensitivity.clone();
    let result = run_blocking(move || handler.handle(cmd)).await?;
    Ok(Json(result))
}

/// POST /analysis/advanced/:project/monte_carlo_simulation/ - Stability simulation
///
/// The simulation is cancelled if the client disconnects before it finishes.
pub async fn monte_carlo_simulation(
    State(state): State<AnalysisAppState>,
    Path(project): Path<String>,
    Json(request): Json<MonteCarloSimulationRequest>,
) -> Result<impl IntoResponse, AnalysisApiError> {
    let project_id = ProjectId::new(project).map_err(DomainError::from)?;
    let cmd = request.into_command(project_id);
    let handler = state.monte_carlo.clone();

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let result = run_blocking(move || handler.handle(cmd, &cancel)).await?;
    Ok(Json(result))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn run_blocking<T, F>(work: F) -> Result<T, AnalysisApiError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AnalysisApiError::Internal(format!("analysis task failed: {}", e)))?
        .map_err(AnalysisApiError::from)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub enum AnalysisApiError {
    Domain(DomainError),
    Internal(String),
}

impl From<DomainError> for AnalysisApiError {
    fn from(err: DomainError) -> Self {
        AnalysisApiError::Domain(err)
    }
}

/// HTTP status for a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::InvalidJudgment
        | ErrorCode::DuplicateJudgment
        | ErrorCode::InvalidParameter
        | ErrorCode::InvalidHierarchy
        | ErrorCode::UnknownElement
        | ErrorCode::MissingPriorities
        | ErrorCode::ElementMismatch
        | ErrorCode::InvalidStateTransition
        | ErrorCode::EvaluationNotCompleted => StatusCode::BAD_REQUEST,
        ErrorCode::IncompleteMatrix
        | ErrorCode::DegenerateMatrix
        | ErrorCode::InsufficientConsistentData => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AnalysisApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            AnalysisApiError::Domain(err) => {
                let status = status_for(err.code);
                if err.code == ErrorCode::Cancelled {
                    info!(reason = %err.message, "analysis cancelled by client");
                } else if status.is_server_error() {
                    warn!(code = %err.code, reason = %err.message, "analysis failed");
                }
                (status, ErrorResponse::from(err))
            }
            AnalysisApiError::Internal(msg) => {
                warn!(error = %msg, "analysis task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(msg))
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judgment_errors_are_client_errors() {
        assert_eq!(status_for(ErrorCode::InvalidJudgment), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::InvalidHierarchy), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unusable_data_is_unprocessable() {
        assert_eq!(
            status_for(ErrorCode::InsufficientConsistentData),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorCode::DegenerateMatrix), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorCode::IncompleteMatrix), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_error_is_500() {
        let response = AnalysisApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn state_builds_from_default_config() {
        let state = AnalysisAppState::from_config(&EngineConfig::default()).unwrap();
        assert_eq!(state.consistency_threshold, 0.10);
    }
}
