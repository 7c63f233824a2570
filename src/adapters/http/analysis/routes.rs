//! Route configuration for analysis endpoints.
//!
//! Configures Axum router with analysis-related routes.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    calculate_group, calculate_hierarchy, calculate_individual, health, monte_carlo_simulation,
    sensitivity_analysis, AnalysisAppState,
};

/// Creates the analysis router with all endpoints.
///
/// Routes:
/// - `POST /analysis/calculate/individual/` - Priorities for one matrix
/// - `POST /analysis/calculate/group/` - Aggregate evaluators (AIP or AIJ)
/// - `POST /analysis/calculate/hierarchy/` - Global weights and alternative scores
/// - `POST /analysis/advanced/:project/sensitivity_analysis/` - Weight sweeps
/// - `POST /analysis/advanced/:project/monte_carlo_simulation/` - Stability simulation
/// - `GET /health` - Liveness check
pub fn analysis_router() -> Router<AnalysisAppState> {
    Router::new()
        .route("/analysis/calculate/individual/", post(calculate_individual))
        .route("/analysis/calculate/group/", post(calculate_group))
        .route("/analysis/calculate/hierarchy/", post(calculate_hierarchy))
        .route(
            "/analysis/advanced/:project/sensitivity_analysis/",
            post(sensitivity_analysis),
        )
        .route(
            "/analysis/advanced/:project/monte_carlo_simulation/",
            post(monte_carlo_simulation),
        )
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    // ───────────────────────────────────────────────────────────────
    // Test helpers
    // ───────────────────────────────────────────────────────────────

    fn app() -> Router {
        let state = AnalysisAppState::from_config(&EngineConfig::default()).unwrap();
        analysis_router().with_state(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // ───────────────────────────────────────────────────────────────
    // Route tests
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn health_route_exists() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn individual_route_exists() {
        let body = r#"{"elements": ["a", "b"], "judgments": [{"left_id": "a", "right_id": "b", "value": 2.0}]}"#;
        let response = app()
            .oneshot(post_json("/analysis/calculate/individual/", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let response = app()
            .oneshot(post_json("/analysis/calculate/unknown/", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_on_post_route_is_not_allowed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/analysis/calculate/group/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
