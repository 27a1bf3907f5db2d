//! REST API module using Axum
//!
//! Provides HTTP endpoints for the well plan dashboard:
//! - v1 API with a consistent response envelope
//! - single-page dashboard HTML compiled into the binary

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::DashboardState;

use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Dashboard page, compiled into the binary.
const DASHBOARD_HTML: &str = include_str!("../../static/index.html");

async fn serve_dashboard() -> Response {
    (StatusCode::OK, Html(DASHBOARD_HTML)).into_response()
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `WELLPLAN_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development against a separate frontend server.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("WELLPLAN_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => {
            // No cross-origin allowed — dashboard is same-origin
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
    }
}

/// Create the complete application router with API and dashboard page.
pub fn create_app(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .nest("/api/v1", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
