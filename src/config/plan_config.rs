//! Planner configuration: every tunable of the scheduling engine as a
//! TOML value.
//!
//! Each struct implements `Default` with the built-in constants from
//! [`super::defaults`], so behavior is unchanged when no config file is
//! present.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{TaskCodeError, TaskKind};
use crate::services::ConstraintBound;

use super::defaults;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config:\n  {}", .0.join("\n  "))]
    Validation(Vec<String>),
    #[error("invalid date '{value}' for {field}: expected YYYY-MM-DD")]
    Date { field: &'static str, value: String },
    #[error("invalid year key '{0}' in [teams.limits]")]
    Year(String),
    #[error(transparent)]
    TaskCode(#[from] TaskCodeError),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a planning deployment.
///
/// Load with `PlanConfig::load()` which searches:
/// 1. `$WELLPLAN_CONFIG` env var
/// 2. `./wellplan.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Project identification and planning window
    #[serde(default)]
    pub project: ProjectConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset locations
    #[serde(default)]
    pub data: DataConfig,

    /// Well economics for NPV
    #[serde(default)]
    pub economics: EconomicsConfig,

    /// Crew fleet and yearly crew limits
    #[serde(default)]
    pub teams: TeamsConfig,

    /// Crew travel model
    #[serde(default)]
    pub movement: MovementConfig,

    /// Production profile source
    #[serde(default)]
    pub production: ProductionConfig,

    /// Cluster risk strategy
    #[serde(default)]
    pub risk: RiskConfig,

    /// Candidate selection (greedy loop) tuning
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Whole-plan annealing refinement
    #[serde(default)]
    pub annealing: AnnealingConfig,

    /// Yearly production / CAPEX bounds
    #[serde(default)]
    pub constraints: ConstraintsConfig,
}

impl PlanConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELLPLAN_CONFIG` environment variable
    /// 2. `./wellplan.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("WELLPLAN_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), project = %config.project.name, "Loaded config from WELLPLAN_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from WELLPLAN_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "WELLPLAN_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("wellplan.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(project = %config.project.name, "Loaded config from ./wellplan.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./wellplan.toml, using defaults");
                }
            }
        }

        info!("No wellplan.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file (used by the setup install step).
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Planner config saved");
        Ok(())
    }

    /// Validate the config for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = super::validation::validate_physical_ranges(self);

        if self.project.start_datetime().is_err() {
            errors.push(format!(
                "project.start = '{}' is not a YYYY-MM-DD date",
                self.project.start
            ));
        }
        for year in self.teams.limits.keys() {
            if year.parse::<i32>().is_err() {
                errors.push(format!("teams.limits key '{year}' is not a year"));
            }
        }
        for group in &self.teams.groups {
            for code in &group.tasks {
                if TaskKind::from_code(code).is_err() {
                    errors.push(format!("teams.groups task code '{code}' is unknown"));
                }
            }
        }
        for code in self.teams.limits.values().flat_map(|by_task| by_task.keys()) {
            if TaskKind::from_code(code).is_err() {
                errors.push(format!("teams.limits task code '{code}' is unknown"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project display name
    #[serde(default = "d_project_name")]
    pub name: String,
    /// Planning window start, YYYY-MM-DD
    #[serde(default = "d_project_start")]
    pub start: String,
    /// Planning horizon length in years
    #[serde(default = "d_horizon_years")]
    pub horizon_years: u32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: d_project_name(),
            start: d_project_start(),
            horizon_years: d_horizon_years(),
        }
    }
}

impl ProjectConfig {
    /// Planning window start at midnight.
    pub fn start_datetime(&self) -> Result<NaiveDateTime, ConfigError> {
        let date = self
            .start
            .parse::<NaiveDate>()
            .map_err(|_| ConfigError::Date {
                field: "project.start",
                value: self.start.clone(),
            })?;
        // Midnight exists on every date.
        Ok(date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN))
    }

    /// Planning window end: start plus the horizon.
    pub fn end_datetime(&self) -> Result<NaiveDateTime, ConfigError> {
        Ok(self.start_datetime()? + Months::new(12 * self.horizon_years))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the dashboard
    #[serde(default = "d_server_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: d_server_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Well inventory CSV
    #[serde(default = "d_wells_path")]
    pub wells_path: PathBuf,
    /// Folder of per-well measured profile CSVs
    #[serde(default = "d_profiles_dir")]
    pub profiles_dir: PathBuf,
    /// Plan schedule export target
    #[serde(default = "d_export_path")]
    pub export_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            wells_path: d_wells_path(),
            profiles_dir: d_profiles_dir(),
            export_path: d_export_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsConfig {
    #[serde(default = "d_oil_price")]
    pub oil_price_per_tonne: f64,
    #[serde(default = "d_oil_cost")]
    pub oil_cost_per_tonne: f64,
    #[serde(default = "d_water_cost")]
    pub water_cost_per_tonne: f64,
    #[serde(default = "d_repair")]
    pub repair_per_year: f64,
    #[serde(default = "d_maintain")]
    pub maintain_per_year: f64,
    #[serde(default = "d_equipment")]
    pub equipment_cost: f64,
    #[serde(default = "d_discount_rate")]
    pub discount_rate: f64,
    #[serde(default = "d_travel_cost")]
    pub travel_cost_per_day: f64,
    /// Construction cost per metre, keyed by well type string
    #[serde(default = "d_build_costs")]
    pub build_cost_per_metre: BTreeMap<String, f64>,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            oil_price_per_tonne: d_oil_price(),
            oil_cost_per_tonne: d_oil_cost(),
            water_cost_per_tonne: d_water_cost(),
            repair_per_year: d_repair(),
            maintain_per_year: d_maintain(),
            equipment_cost: d_equipment(),
            discount_rate: d_discount_rate(),
            travel_cost_per_day: d_travel_cost(),
            build_cost_per_metre: d_build_costs(),
        }
    }
}

/// One homogeneous group of crews: shared capabilities, headcount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGroup {
    /// Task codes every crew in the group supports (e.g. `["ГС"]`)
    pub tasks: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "d_team_groups")]
    pub groups: Vec<TeamGroup>,
    /// Yearly crew-count caps: year -> task code -> max distinct crews.
    /// TOML table keys are strings, so years are parsed on demand.
    #[serde(default)]
    pub limits: BTreeMap<String, BTreeMap<String, usize>>,
    /// Count co-located drilling crews into context metadata
    #[serde(default = "d_true")]
    pub count_colocated: bool,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            groups: d_team_groups(),
            limits: BTreeMap::new(),
            count_colocated: true,
        }
    }
}

impl TeamsConfig {
    /// Parse the string-keyed limit table into planner form.
    pub fn yearly_limits(
        &self,
    ) -> Result<BTreeMap<i32, BTreeMap<TaskKind, usize>>, ConfigError> {
        let mut out = BTreeMap::new();
        for (year, by_task) in &self.limits {
            let year: i32 = year
                .parse()
                .map_err(|_| ConfigError::Year(year.clone()))?;
            let mut tasks = BTreeMap::new();
            for (code, cap) in by_task {
                tasks.insert(TaskKind::from_code(code)?, *cap);
            }
            out.insert(year, tasks);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementModel {
    /// Fixed day counts: same pad vs different pad
    Simple,
    /// 3-D pad coordinates, distance / speed with a floor
    Distance,
}

/// A pad location for the distance movement model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClusterPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    #[serde(default = "d_movement_model")]
    pub model: MovementModel,
    #[serde(default = "d_same_cluster_days")]
    pub same_cluster_move_days: f64,
    #[serde(default = "d_min_days_between")]
    pub min_days_between_clusters: f64,
    #[serde(default = "d_team_speed")]
    pub team_speed_kmh: f64,
    /// Pad coordinates, required only for the distance model
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterPosition>,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            model: d_movement_model(),
            same_cluster_move_days: d_same_cluster_days(),
            min_days_between_clusters: d_min_days_between(),
            team_speed_kmh: d_team_speed(),
            clusters: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Linear,
    Arps,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionConfig {
    #[serde(default = "d_profile_kind")]
    pub profile: ProfileKind,
    #[serde(default = "d_arps_decline")]
    pub arps_decline: f64,
    #[serde(default = "d_arps_b")]
    pub arps_b: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            profile: d_profile_kind(),
            arps_decline: d_arps_decline(),
            arps_b: d_arps_b(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_risk_chance")]
    pub trigger_chance: f64,
    #[serde(default = "d_risk_impact")]
    pub impact: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger_chance: d_risk_chance(),
            impact: d_risk_impact(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "d_sel_temp")]
    pub initial_temp: f64,
    #[serde(default = "d_sel_cooling")]
    pub cooling_rate: f64,
    #[serde(default = "d_sel_min_temp")]
    pub min_temp: f64,
    #[serde(default = "d_sel_iters")]
    pub iterations_per_temp: usize,
    /// Plan wells strictly by their requested entry dates
    #[serde(default)]
    pub keep_order: bool,
    /// Consider only the earliest candidate per pad each round
    #[serde(default = "d_true")]
    pub cluster_ordered: bool,
    /// Penalize co-located drilling crews in candidate scores
    #[serde(default = "d_true")]
    pub drill_team_penalty: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            initial_temp: d_sel_temp(),
            cooling_rate: d_sel_cooling(),
            min_temp: d_sel_min_temp(),
            iterations_per_temp: d_sel_iters(),
            keep_order: false,
            cluster_ordered: true,
            drill_team_penalty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Run the whole-plan refinement pass after the greedy build
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "d_ann_temp")]
    pub initial_temp: f64,
    #[serde(default = "d_ann_cooling")]
    pub cooling_rate: f64,
    #[serde(default = "d_ann_min_temp")]
    pub min_temp: f64,
    #[serde(default = "d_ann_iters")]
    pub iterations: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_temp: d_ann_temp(),
            cooling_rate: d_ann_cooling(),
            min_temp: d_ann_min_temp(),
            iterations: d_ann_iters(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintsConfig {
    /// Minimum yearly oil production bounds (tonnes)
    #[serde(default)]
    pub oil: Vec<ConstraintBound>,
    /// Maximum yearly CAPEX bounds (currency)
    #[serde(default)]
    pub capex: Vec<ConstraintBound>,
}

// ============================================================================
// Serde default helpers
// ============================================================================

fn d_true() -> bool {
    true
}
fn d_project_name() -> String {
    defaults::PROJECT_NAME.to_string()
}
fn d_project_start() -> String {
    defaults::PROJECT_START.to_string()
}
fn d_horizon_years() -> u32 {
    defaults::HORIZON_YEARS
}
fn d_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}
fn d_wells_path() -> PathBuf {
    defaults::WELLS_PATH.into()
}
fn d_profiles_dir() -> PathBuf {
    defaults::PROFILES_DIR.into()
}
fn d_export_path() -> PathBuf {
    defaults::EXPORT_PATH.into()
}
fn d_oil_price() -> f64 {
    defaults::OIL_PRICE_PER_TONNE
}
fn d_oil_cost() -> f64 {
    defaults::OIL_COST_PER_TONNE
}
fn d_water_cost() -> f64 {
    defaults::WATER_COST_PER_TONNE
}
fn d_repair() -> f64 {
    defaults::REPAIR_PER_YEAR
}
fn d_maintain() -> f64 {
    defaults::MAINTAIN_PER_YEAR
}
fn d_equipment() -> f64 {
    defaults::EQUIPMENT_COST
}
fn d_discount_rate() -> f64 {
    defaults::DISCOUNT_RATE
}
fn d_travel_cost() -> f64 {
    defaults::TRAVEL_COST_PER_DAY
}
fn d_build_costs() -> BTreeMap<String, f64> {
    let mut costs = BTreeMap::new();
    costs.insert("ГС".to_string(), defaults::BUILD_COST_PER_METRE_DRILLING);
    costs.insert("ГС+ГРП".to_string(), defaults::BUILD_COST_PER_METRE_FRAC);
    costs
}
fn d_team_groups() -> Vec<TeamGroup> {
    vec![
        TeamGroup {
            tasks: vec!["ГС".to_string()],
            count: defaults::DRILLING_TEAMS,
        },
        TeamGroup {
            tasks: vec!["ГРП".to_string()],
            count: defaults::FRAC_TEAMS,
        },
    ]
}
fn d_movement_model() -> MovementModel {
    MovementModel::Simple
}
fn d_same_cluster_days() -> f64 {
    defaults::SAME_CLUSTER_MOVE_DAYS
}
fn d_min_days_between() -> f64 {
    defaults::MIN_DAYS_BETWEEN_CLUSTERS
}
fn d_team_speed() -> f64 {
    defaults::TEAM_SPEED_KMH
}
fn d_profile_kind() -> ProfileKind {
    ProfileKind::Linear
}
fn d_arps_decline() -> f64 {
    defaults::ARPS_DECLINE
}
fn d_arps_b() -> f64 {
    defaults::ARPS_B
}
fn d_risk_chance() -> f64 {
    defaults::RISK_TRIGGER_CHANCE
}
fn d_risk_impact() -> f64 {
    defaults::RISK_IMPACT
}
fn d_sel_temp() -> f64 {
    defaults::SELECTION_INITIAL_TEMP
}
fn d_sel_cooling() -> f64 {
    defaults::SELECTION_COOLING_RATE
}
fn d_sel_min_temp() -> f64 {
    defaults::SELECTION_MIN_TEMP
}
fn d_sel_iters() -> usize {
    defaults::SELECTION_ITERATIONS
}
fn d_ann_temp() -> f64 {
    defaults::ANNEALING_INITIAL_TEMP
}
fn d_ann_cooling() -> f64 {
    defaults::ANNEALING_COOLING_RATE
}
fn d_ann_min_temp() -> f64 {
    defaults::ANNEALING_MIN_TEMP
}
fn d_ann_iters() -> usize {
    defaults::ANNEALING_ITERATIONS
}
