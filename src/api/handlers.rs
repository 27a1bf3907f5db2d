//! Dashboard endpoint handlers.
//!
//! All state lives in [`DashboardState`]: the loaded config, the well
//! inventory and the most recently compiled plan. Compilation is CPU
//! bound and runs off the async runtime via `spawn_blocking`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::PlanConfig;
use crate::core::{Plan, Well};
use crate::data::PlanExporter;
use crate::planner;

use super::envelope::{ApiErrorResponse, ApiResponse};

/// Shared state behind every dashboard endpoint.
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<PlanConfig>,
    pub wells: Arc<RwLock<Vec<Well>>>,
    pub plan: Arc<RwLock<Option<Plan>>>,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(config: PlanConfig, wells: Vec<Well>) -> Self {
        Self {
            config: Arc::new(config),
            wells: Arc::new(RwLock::new(wells)),
            plan: Arc::new(RwLock::new(None)),
            started_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct StatusBody {
    project: String,
    server_addr: String,
    wells: usize,
    plan_compiled: bool,
    /// Cumulative planned oil production up to now, tonnes.
    oil_produced_to_date: f64,
    liquid_produced_to_date: f64,
    uptime_seconds: i64,
}

#[derive(Serialize)]
struct PlanSummary {
    id: Uuid,
    wells: usize,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    total_profit: f64,
    mean_well_cost: f64,
    well_costs: BTreeMap<String, f64>,
}

impl PlanSummary {
    fn from_plan(plan: &Plan) -> Self {
        Self {
            id: plan.id,
            wells: plan.well_plans.len(),
            start: plan.start_date(),
            end: plan.end_date(),
            total_profit: plan.total_profit(),
            mean_well_cost: plan.mean_well_cost(),
            well_costs: plan
                .well_plans
                .iter()
                .filter_map(|wp| wp.cost.map(|c| (wp.well.name.clone(), c)))
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct GanttRow {
    well: String,
    cluster: String,
    task: String,
    team: Uuid,
    start: NaiveDateTime,
    end: NaiveDateTime,
    travel_days: f64,
}

#[derive(Serialize)]
struct ProductionBody {
    oil_per_year: BTreeMap<i32, f64>,
    oil_per_year_new_wells: BTreeMap<i32, f64>,
    oil_per_year_existing_wells: BTreeMap<i32, f64>,
    well_starts_per_year: BTreeMap<i32, u32>,
    mean_oil_per_year: BTreeMap<i32, f64>,
    capex_per_year: BTreeMap<i32, f64>,
}

#[derive(Serialize)]
struct MonthlyProductionBody {
    oil_per_month: BTreeMap<NaiveDate, f64>,
    oil_per_month_new_wells: BTreeMap<NaiveDate, f64>,
    oil_per_month_existing_wells: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompileRequest {
    /// Fix the planner RNG for a reproducible schedule.
    pub seed: Option<u64>,
}

pub async fn get_health() -> Response {
    ApiResponse::ok(serde_json::json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<DashboardState>) -> Response {
    let wells = state.wells.read().await.len();
    let now = Utc::now().naive_utc();
    let plan = state.plan.read().await;
    ApiResponse::ok(StatusBody {
        project: state.config.project.name.clone(),
        server_addr: state.config.server.addr.clone(),
        wells,
        plan_compiled: plan.is_some(),
        oil_produced_to_date: plan.as_ref().map_or(0.0, |p| p.oil_production_at(now)),
        liquid_produced_to_date: plan.as_ref().map_or(0.0, |p| p.liquid_production_at(now)),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

pub async fn get_wells(State(state): State<DashboardState>) -> Response {
    let wells = state.wells.read().await;
    ApiResponse::ok(wells.clone())
}

pub async fn get_plan(State(state): State<DashboardState>) -> Response {
    match state.plan.read().await.as_ref() {
        Some(plan) => ApiResponse::for_plan(plan.id, PlanSummary::from_plan(plan)),
        None => ApiErrorResponse::not_found("no plan compiled yet"),
    }
}

pub async fn get_gantt(State(state): State<DashboardState>) -> Response {
    let plan = state.plan.read().await;
    let Some(plan) = plan.as_ref() else {
        return ApiErrorResponse::not_found("no plan compiled yet");
    };

    let rows: Vec<GanttRow> = plan
        .well_plans
        .iter()
        .flat_map(|wp| {
            wp.entries.iter().map(|entry| GanttRow {
                well: wp.well.name.clone(),
                cluster: wp.well.cluster.clone(),
                task: entry.task.code().to_string(),
                team: entry.team.id,
                start: entry.start,
                end: entry.end,
                travel_days: entry.travel_days,
            })
        })
        .collect();
    ApiResponse::for_plan(plan.id, rows)
}

pub async fn get_production(State(state): State<DashboardState>) -> Response {
    let plan = state.plan.read().await;
    let Some(plan) = plan.as_ref() else {
        return ApiErrorResponse::not_found("no plan compiled yet");
    };

    ApiResponse::for_plan(plan.id, ProductionBody {
        oil_per_year: plan.oil_per_year(),
        oil_per_year_new_wells: plan.oil_per_year_new_wells(),
        oil_per_year_existing_wells: plan.oil_per_year_existing_wells(),
        well_starts_per_year: plan.well_starts_per_year(),
        mean_oil_per_year: plan.mean_oil_per_year(),
        capex_per_year: plan.capex_per_year(),
    })
}

pub async fn get_production_monthly(State(state): State<DashboardState>) -> Response {
    let plan = state.plan.read().await;
    let Some(plan) = plan.as_ref() else {
        return ApiErrorResponse::not_found("no plan compiled yet");
    };

    ApiResponse::for_plan(plan.id, MonthlyProductionBody {
        oil_per_month: plan.oil_per_month(),
        oil_per_month_new_wells: plan.oil_per_month_new_wells(),
        oil_per_month_existing_wells: plan.oil_per_month_existing_wells(),
    })
}

pub async fn export_plan(State(state): State<DashboardState>) -> Response {
    let plan = state.plan.read().await;
    let Some(plan) = plan.as_ref() else {
        return ApiErrorResponse::not_found("no plan compiled yet");
    };

    match PlanExporter::to_bytes(plan) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"plan_schedule.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "plan export failed");
            ApiErrorResponse::internal(format!("export failed: {e}"))
        }
    }
}

/// POST /plan/compile — build (and optionally anneal) a fresh plan.
pub async fn compile_plan(
    State(state): State<DashboardState>,
    body: Option<Json<CompileRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let config = Arc::clone(&state.config);
    let wells = state.wells.read().await.clone();

    let compiled = tokio::task::spawn_blocking(move || {
        planner::compile_from_config(&config, &wells, request.seed)
    })
    .await;

    let plan = match compiled {
        Ok(Ok(plan)) => plan,
        Ok(Err(e)) => {
            error!(error = %e, "plan compilation failed");
            return ApiErrorResponse::bad_request(format!("compilation failed: {e}"));
        }
        Err(e) => {
            error!(error = %e, "plan compilation task panicked");
            return ApiErrorResponse::internal("compilation task failed");
        }
    };

    info!(
        plan = %plan.id,
        wells = plan.well_plans.len(),
        profit = plan.total_profit(),
        "plan compiled"
    );
    let plan_id = plan.id;
    let summary = PlanSummary::from_plan(&plan);
    *state.plan.write().await = Some(plan);
    ApiResponse::for_plan(plan_id, summary)
}
