//! Config-driven plan compilation.
//!
//! Wires the configured services together and runs the builder, so the
//! CLI, the dashboard and the setup self-check all compile plans the
//! same way.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;

use crate::builder::{CompileOptions, PlanBuilder, PlanError, SelectionParams};
use crate::config::{ConfigError, MovementModel, PlanConfig, ProfileKind};
use crate::core::{Plan, TeamPool, Well};
use crate::data::{DataError, ProfileStore};
use crate::optimization::AnnealingPlanner;
use crate::services::{
    ArpsDeclineProfile, BaseCapex, BaseOpex, CapexConstraint, ClusterRandomRisk, Constraint,
    ConstraintManager, Coordinate, DistanceMovement, FileProfile, LinearProfile, Movement, Npv,
    OilConstraint, ProductionProfile, RiskStrategy, SimpleMovement, TeamManager,
};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Compile a plan for `wells` using every knob from `config`.
///
/// `seed` fixes the RNG for reproducible runs; otherwise entropy is used.
pub fn compile_from_config(
    config: &PlanConfig,
    wells: &[Well],
    seed: Option<u64>,
) -> Result<Plan, PlannerError> {
    let start = config.project.start_datetime()?;
    let end = config.project.end_datetime()?;

    let mut manager = build_team_manager(config)?;
    let builder = build_plan_builder(config)?;
    let mut risk = build_risk(config);

    let options = CompileOptions {
        keep_order: config.selection.keep_order,
        cluster_ordered: config.selection.cluster_ordered,
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(
        wells = wells.len(),
        start = %start.date(),
        end = %end.date(),
        "compiling plan"
    );

    let plan = builder.compile(
        wells,
        &mut manager,
        risk.as_mut().map(|r| r as &mut (dyn RiskStrategy + 'static)),
        options,
        &mut rng,
    )?;

    if !config.annealing.enabled {
        return Ok(plan);
    }

    let a = &config.annealing;
    let annealer = AnnealingPlanner::new(a.initial_temp, a.cooling_rate, a.min_temp, a.iterations);
    Ok(annealer.optimize(&plan, &mut manager, &mut rng))
}

/// Crew fleet with the configured movement model and yearly limits.
pub fn build_team_manager(config: &PlanConfig) -> Result<TeamManager, PlannerError> {
    let mut pool = TeamPool::new();
    for group in &config.teams.groups {
        pool.add_teams_from_codes(&group.tasks, group.count)
            .map_err(ConfigError::TaskCode)?;
    }

    let movement: Box<dyn Movement> = match config.movement.model {
        MovementModel::Simple => Box::new(SimpleMovement),
        MovementModel::Distance => {
            let coordinates: HashMap<String, Coordinate> = config
                .movement
                .clusters
                .iter()
                .map(|(cluster, pos)| {
                    (
                        cluster.clone(),
                        Coordinate {
                            x: pos.x,
                            y: pos.y,
                            z: pos.z,
                        },
                    )
                })
                .collect();
            Box::new(
                DistanceMovement::new(coordinates)
                    .with_floor(config.movement.min_days_between_clusters)
                    .with_speed(config.movement.team_speed_kmh)
                    .with_same_cluster_days(config.movement.same_cluster_move_days),
            )
        }
    };

    Ok(TeamManager::new(pool, movement)
        .with_limits(config.teams.yearly_limits()?)
        .with_colocation_count(config.teams.count_colocated))
}

fn build_plan_builder(config: &PlanConfig) -> Result<PlanBuilder, PlannerError> {
    let e = &config.economics;
    let cost = Npv::new(
        e.oil_price_per_tonne,
        config.project.start_datetime()?,
        Box::new(BaseCapex::new(
            e.build_cost_per_metre.clone(),
            e.equipment_cost,
        )),
        Box::new(BaseOpex::new(
            e.oil_cost_per_tonne,
            e.water_cost_per_tonne,
            e.repair_per_year,
            e.maintain_per_year,
        )),
    )
    .with_discount_rate(e.discount_rate)
    .with_travel_cost_per_day(e.travel_cost_per_day);

    let s = &config.selection;
    Ok(PlanBuilder::new(
        config.project.start_datetime()?,
        config.project.end_datetime()?,
        Box::new(cost),
    )
    .with_production_profile(build_profile(config)?)
    .with_constraints(build_constraints(config))
    .with_selection(SelectionParams {
        initial_temp: s.initial_temp,
        cooling_rate: s.cooling_rate,
        min_temp: s.min_temp,
        iterations_per_temp: s.iterations_per_temp,
    })
    .with_drill_team_penalty(s.drill_team_penalty))
}

fn build_profile(config: &PlanConfig) -> Result<Box<dyn ProductionProfile>, PlannerError> {
    let p = &config.production;
    let arps = ArpsDeclineProfile::new(p.arps_decline, p.arps_b);
    Ok(match p.profile {
        ProfileKind::Linear => Box::new(LinearProfile),
        ProfileKind::Arps => Box::new(arps),
        ProfileKind::File => {
            let profiles = ProfileStore::new(&config.data.profiles_dir).load()?;
            Box::new(FileProfile::new(profiles).with_fallback(arps))
        }
    })
}

fn build_constraints(config: &PlanConfig) -> ConstraintManager {
    let mut constraints: Vec<Box<dyn Constraint>> = Vec::new();
    if !config.constraints.oil.is_empty() {
        constraints.push(Box::new(OilConstraint::new(config.constraints.oil.clone())));
    }
    if !config.constraints.capex.is_empty() {
        constraints.push(Box::new(CapexConstraint::new(
            config.constraints.capex.clone(),
        )));
    }
    ConstraintManager::new(constraints)
}

fn build_risk(config: &PlanConfig) -> Option<ClusterRandomRisk> {
    config
        .risk
        .enabled
        .then(|| ClusterRandomRisk::new(config.risk.trigger_chance, config.risk.impact))
}
