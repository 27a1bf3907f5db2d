//! Well plan optimization: field development scheduling and NPV.
//!
//! ## Architecture
//!
//! - **core**: the domain model — tasks, crews, wells, schedules, plans
//! - **services**: pluggable planning services (economics, production
//!   profiles, crew management, risk, constraints)
//! - **builder**: greedy plan construction with annealing candidate selection
//! - **optimization**: whole-plan simulated-annealing refinement
//! - **data**: CSV inventory / profile loading and schedule export
//! - **planner**: config-driven wiring of all of the above
//! - **api**: axum dashboard
//! - **bootstrap**: first-run setup and preflight checks

pub mod api;
pub mod bootstrap;
pub mod builder;
pub mod config;
pub mod core;
pub mod data;
pub mod optimization;
pub mod planner;
pub mod services;

// Re-export the domain model
pub use core::{Plan, ScheduleEntry, TaskKind, Team, TeamPool, Well, WellPlanContext};

// Re-export configuration
pub use config::PlanConfig;

// Re-export the planning entry points
pub use builder::{CompileOptions, PlanBuilder, PlanError, SelectionParams};
pub use optimization::AnnealingPlanner;
pub use planner::compile_from_config;

// Re-export data access
pub use data::{CsvWellLoader, DataError, PlanExporter, ProfileStore};
