//! Built-in default values.
//!
//! Centralises the numbers used when no `wellplan.toml` overrides them.
//! Grouped by config section for easy discovery.

// ============================================================================
// Project
// ============================================================================

/// Default project name shown in the dashboard and logs.
pub const PROJECT_NAME: &str = "Well Plan Optimization";

/// Default project start date.
pub const PROJECT_START: &str = "2025-01-01";

/// Default planning horizon (years).
pub const HORIZON_YEARS: u32 = 10;

// ============================================================================
// Server
// ============================================================================

/// Default dashboard bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Data
// ============================================================================

/// Default well inventory path, relative to the working directory.
pub const WELLS_PATH: &str = "data/wells.csv";

/// Default folder with per-well measured profile CSVs.
pub const PROFILES_DIR: &str = "data/profiles";

/// Default plan export path.
pub const EXPORT_PATH: &str = "plan_schedule.csv";

// ============================================================================
// Economics
// ============================================================================

/// Oil netback price (currency per tonne).
pub const OIL_PRICE_PER_TONNE: f64 = 24_000.0;

/// Oil lifting cost (currency per tonne).
pub const OIL_COST_PER_TONNE: f64 = 1_000.0;

/// Produced water handling cost (currency per tonne).
pub const WATER_COST_PER_TONNE: f64 = 200.0;

/// Flat well repair budget (currency per year).
pub const REPAIR_PER_YEAR: f64 = 1_200_000.0;

/// Flat well maintenance budget (currency per year).
pub const MAINTAIN_PER_YEAR: f64 = 600_000.0;

/// Fixed surface equipment cost per well.
pub const EQUIPMENT_COST: f64 = 6_000_000.0;

/// Construction cost per metre for a plain horizontal well.
pub const BUILD_COST_PER_METRE_DRILLING: f64 = 40_000.0;

/// Construction cost per metre for a fractured horizontal well.
pub const BUILD_COST_PER_METRE_FRAC: f64 = 52_000.0;

/// Annual discount rate for NPV.
pub const DISCOUNT_RATE: f64 = 0.125;

/// Crew mobilization cost (currency per travel day).
pub const TRAVEL_COST_PER_DAY: f64 = 1_500_000.0;

// ============================================================================
// Crews and movement
// ============================================================================

/// Default number of drilling crews.
pub const DRILLING_TEAMS: usize = 2;

/// Default number of frac crews.
pub const FRAC_TEAMS: usize = 1;

/// Crew move-in time within one pad (days).
pub const SAME_CLUSTER_MOVE_DAYS: f64 = 1.0;

/// Floor on inter-pad moves for the distance model (days).
pub const MIN_DAYS_BETWEEN_CLUSTERS: f64 = 90.0;

/// Rig move convoy speed (km/h).
pub const TEAM_SPEED_KMH: f64 = 15.0;

// ============================================================================
// Optimizer
// ============================================================================

/// Candidate-selection annealing start temperature.
pub const SELECTION_INITIAL_TEMP: f64 = 1_000.0;

/// Candidate-selection cooling rate per temperature step.
pub const SELECTION_COOLING_RATE: f64 = 0.95;

/// Candidate-selection stop temperature.
pub const SELECTION_MIN_TEMP: f64 = 1.0;

/// Candidate-selection iterations per temperature step.
pub const SELECTION_ITERATIONS: usize = 10;

/// Whole-plan annealing start temperature.
pub const ANNEALING_INITIAL_TEMP: f64 = 1_000.0;

/// Whole-plan annealing cooling rate.
pub const ANNEALING_COOLING_RATE: f64 = 0.95;

/// Whole-plan annealing stop temperature.
pub const ANNEALING_MIN_TEMP: f64 = 1.0;

/// Whole-plan annealing iterations per temperature step.
pub const ANNEALING_ITERATIONS: usize = 100;

/// Arps hyperbolic decline rate (nominal, per month).
pub const ARPS_DECLINE: f64 = 0.175;

/// Arps hyperbolic exponent.
pub const ARPS_B: f64 = 1.548;

/// Cluster risk trigger probability.
pub const RISK_TRIGGER_CHANCE: f64 = 0.3;

/// Production reduction applied when cluster risk triggers.
pub const RISK_IMPACT: f64 = 0.1;
