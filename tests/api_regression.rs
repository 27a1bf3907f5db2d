//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port — runs in CI without `#[ignore]`.

use wellplan::api::{create_app, DashboardState};
use wellplan::config::PlanConfig;
use wellplan::core::Well;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

fn well(name: &str, cluster: &str, well_type: &str) -> Well {
    Well {
        name: name.to_string(),
        cluster: cluster.to_string(),
        field: "Поле".to_string(),
        layer: "Ю1".to_string(),
        purpose: "production".to_string(),
        well_type: well_type.to_string(),
        oil_rate: 100.0,
        liq_rate: 150.0,
        length: 3000.0,
        init_entry_date: None,
        readiness_date: None,
        depend_from_cluster: None,
    }
}

fn create_test_state() -> DashboardState {
    DashboardState::new(
        PlanConfig::default(),
        vec![
            well("W-1", "K-1", "ГС"),
            well("W-2", "K-1", "ГС+ГРП"),
            well("W-3", "K-2", "ГС"),
        ],
    )
}

async fn compile(state: &DashboardState) {
    let app = create_app(state.clone());
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/plan/compile")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"seed": 17}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

/// All pre-compile GET endpoints should return 200.
#[tokio::test]
async fn test_basic_get_endpoints_return_200() {
    let state = create_test_state();
    for endpoint in ["/api/v1/health", "/api/v1/status", "/api/v1/wells"] {
        let app = create_app(state.clone());
        let resp = app
            .oneshot(Request::builder().uri(endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{endpoint}");
    }
}

/// Plan views 404 until a plan has been compiled.
#[tokio::test]
async fn test_plan_views_404_before_compile() {
    let state = create_test_state();
    for endpoint in [
        "/api/v1/plan",
        "/api/v1/plan/gantt",
        "/api/v1/plan/production",
        "/api/v1/plan/production/monthly",
        "/api/v1/plan/export",
    ] {
        let app = create_app(state.clone());
        let resp = app
            .oneshot(Request::builder().uri(endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{endpoint}");
    }
}

/// Compile, then every plan view answers 200.
#[tokio::test]
async fn test_plan_views_after_compile() {
    let state = create_test_state();
    compile(&state).await;

    for endpoint in [
        "/api/v1/plan",
        "/api/v1/plan/gantt",
        "/api/v1/plan/production",
        "/api/v1/plan/production/monthly",
    ] {
        let app = create_app(state.clone());
        let resp = app
            .oneshot(Request::builder().uri(endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{endpoint}");
    }
}

/// The plan summary carries the envelope and the expected fields.
#[tokio::test]
async fn test_plan_summary_shape() {
    let state = create_test_state();
    compile(&state).await;

    let app = create_app(state);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/plan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert!(v.get("meta").is_some());
    let data = &v["data"];
    assert_eq!(data["wells"], 3);
    assert!(data["total_profit"].is_number());
    assert!(data["well_costs"].get("W-1").is_some());
    // Plan views stamp the plan id into the envelope meta.
    assert_eq!(v["meta"]["plan"], data["id"]);
}

/// Gantt rows reference only inventory wells and valid task codes.
#[tokio::test]
async fn test_gantt_rows_are_consistent() {
    let state = create_test_state();
    compile(&state).await;

    let app = create_app(state);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/plan/gantt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let rows = v["data"].as_array().unwrap();
    assert!(!rows.is_empty());
    for row in rows {
        let well = row["well"].as_str().unwrap();
        assert!(["W-1", "W-2", "W-3"].contains(&well));
        // Canonical task codes, not the inventory aliases.
        let task = row["task"].as_str().unwrap();
        assert!(["DRILLING", "GTM"].contains(&task));
        assert!(row["start"].as_str().unwrap() < row["end"].as_str().unwrap());
    }
}

/// Export answers CSV with a download disposition.
#[tokio::test]
async fn test_export_is_csv_download() {
    let state = create_test_state();
    compile(&state).await;

    let app = create_app(state);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/plan/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("field,cluster,well,"));
    assert!(text.contains("W-1"));
}

/// The root path serves the embedded dashboard page.
#[tokio::test]
async fn test_root_serves_dashboard_html() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Well Plan Optimization"));
}
