//! API route definitions
//!
//! Organizes endpoints for the well plan dashboard:
//! - /api/v1/health - liveness probe
//! - /api/v1/status - project, inventory and plan state
//! - /api/v1/wells - loaded well inventory
//! - /api/v1/plan - compiled plan summary and derived views
//! - /api/v1/plan/compile - trigger a (re)compile

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, DashboardState};

/// Create all API routes for the dashboard
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/status", get(handlers::get_status))
        .route("/wells", get(handlers::get_wells))
        // Plan views
        .route("/plan", get(handlers::get_plan))
        .route("/plan/gantt", get(handlers::get_gantt))
        .route("/plan/production", get(handlers::get_production))
        .route("/plan/production/monthly", get(handlers::get_production_monthly))
        .route("/plan/export", get(handlers::export_plan))
        // Compilation trigger
        .route("/plan/compile", post(handlers::compile_plan))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::core::well::test_support::well;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn create_test_state() -> DashboardState {
        DashboardState::new(
            PlanConfig::default(),
            vec![well("W-1", "K-1", "ГС"), well("W-2", "K-2", "ГС+ГРП")],
        )
    }

    async fn get_status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_api_routes_health() {
        let app = api_routes(create_test_state());
        assert_eq!(get_status_of(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_status() {
        let app = api_routes(create_test_state());
        assert_eq!(get_status_of(app, "/status").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_wells() {
        let app = api_routes(create_test_state());
        assert_eq!(get_status_of(app, "/wells").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_plan_views_need_a_compiled_plan() {
        for uri in [
            "/plan",
            "/plan/gantt",
            "/plan/production",
            "/plan/production/monthly",
            "/plan/export",
        ] {
            let app = api_routes(create_test_state());
            assert_eq!(
                get_status_of(app, uri).await,
                StatusCode::NOT_FOUND,
                "{uri} should 404 before compile"
            );
        }
    }

    #[tokio::test]
    async fn test_compile_then_plan_summary() {
        let state = create_test_state();
        let app = api_routes(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/plan/compile")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"seed": 9}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let app = api_routes(state);
        assert_eq!(get_status_of(app, "/plan").await, StatusCode::OK);
    }
}
