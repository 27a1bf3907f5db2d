//! Greedy plan construction with simulated-annealing candidate selection.
//!
//! The builder repeatedly proposes a schedule for every remaining well,
//! filters the proposals through risk, cost and constraints, picks one
//! winner and commits it. When a whole period admits nothing, the cursor
//! jumps to the next constraint boundary.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{meta, Plan, Well, WellPlanContext};
use crate::services::{
    ConstraintManager, CostError, CostFunction, Infrastructure, LinearProfile, ProductionProfile,
    RiskStrategy, SimpleInfrastructure, TeamError, TeamManager,
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Team(#[from] TeamError),
    #[error(transparent)]
    Cost(#[from] CostError),
}

/// Annealing schedule for candidate selection.
#[derive(Debug, Clone, Copy)]
pub struct SelectionParams {
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub min_temp: f64,
    pub iterations_per_temp: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            initial_temp: 1000.0,
            cooling_rate: 0.95,
            min_temp: 1.0,
            iterations_per_temp: 10,
        }
    }
}

/// Per-compile switches.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Pick candidates by their original business-plan entry date instead
    /// of annealing over scores.
    pub keep_order: bool,
    /// Admit only the earliest-dated well of each cluster per round.
    pub cluster_ordered: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            keep_order: false,
            cluster_ordered: true,
        }
    }
}

pub struct PlanBuilder {
    start: NaiveDateTime,
    end: NaiveDateTime,
    cost: Box<dyn CostFunction>,
    infra: Box<dyn Infrastructure>,
    profiler: Box<dyn ProductionProfile>,
    constraints: ConstraintManager,
    use_drill_team_penalty: bool,
    selection: SelectionParams,
}

impl PlanBuilder {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, cost: Box<dyn CostFunction>) -> Self {
        Self {
            start,
            end,
            cost,
            infra: Box::new(SimpleInfrastructure),
            profiler: Box::new(LinearProfile),
            constraints: ConstraintManager::default(),
            use_drill_team_penalty: true,
            selection: SelectionParams::default(),
        }
    }

    pub fn with_infrastructure(mut self, infra: Box<dyn Infrastructure>) -> Self {
        self.infra = infra;
        self
    }

    pub fn with_production_profile(mut self, profiler: Box<dyn ProductionProfile>) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintManager) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_selection(mut self, selection: SelectionParams) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_drill_team_penalty(mut self, enabled: bool) -> Self {
        self.use_drill_team_penalty = enabled;
        self
    }

    /// Build a plan for `wells`, consuming crew capacity from `manager`.
    pub fn compile(
        &self,
        wells: &[Well],
        manager: &mut TeamManager,
        mut risk: Option<&mut (dyn RiskStrategy + 'static)>,
        options: CompileOptions,
        rng: &mut StdRng,
    ) -> Result<Plan, PlanError> {
        let mut plan = Plan::new();
        let mut remaining: Vec<Well> = wells.to_vec();
        let mut current_start = self.start;

        while !remaining.is_empty() && current_start < self.end {
            let candidates = self.build_contexts(&remaining, manager, current_start)?;
            if candidates.is_empty() {
                break;
            }

            let candidates = self.filter_candidates(
                candidates,
                &plan,
                risk.as_deref_mut(),
                options.cluster_ordered,
            )?;

            if candidates.is_empty() {
                let next_year = self
                    .constraints
                    .period_end(current_start.year())
                    .unwrap_or(current_start.year() + 1);
                info!(
                    year = current_start.year(),
                    next_year, "no admissible candidates, advancing period"
                );
                current_start = NaiveDate::from_ymd_opt(next_year, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap_or(self.end);
                continue;
            }

            let mut best = self.select_best_candidate(candidates, options.keep_order, rng);
            debug!(
                well = %best.well.name,
                cost = ?best.cost,
                "committing candidate"
            );
            manager.assign(&best);
            remaining.retain(|w| w.name != best.well.name);

            if let Some(r) = risk.as_deref_mut() {
                r.define_risk(&mut best);
                self.cost.compute(&mut best)?;
            }

            plan.add_context(best);
        }

        Ok(plan)
    }

    fn build_contexts(
        &self,
        remaining: &[Well],
        manager: &TeamManager,
        start: NaiveDateTime,
    ) -> Result<Vec<WellPlanContext>, PlanError> {
        let mut contexts = Vec::new();
        for well in remaining {
            if let Some(ctx) = self.build_context(well, remaining, manager, start)? {
                contexts.push(ctx);
            }
        }
        Ok(contexts)
    }

    fn build_context(
        &self,
        well: &Well,
        remaining: &[Well],
        manager: &TeamManager,
        start: NaiveDateTime,
    ) -> Result<Option<WellPlanContext>, PlanError> {
        if !cluster_finished(well.depend_from_cluster.as_deref(), remaining) {
            return Ok(None);
        }

        let ctx_start = self
            .infra
            .ready_date(well)
            .map_or(start, |ready| ready.max(start));
        let mut ctx = WellPlanContext::new(well.clone(), ctx_start, self.end);

        manager.get_assignments(&mut ctx)?;

        // Drop wells that do not fit the horizon.
        if ctx.next_available_date() > self.end || ctx.entries.is_empty() {
            return Ok(None);
        }

        self.profiler.compute(&mut ctx);
        Ok(Some(ctx))
    }

    fn filter_candidates(
        &self,
        mut candidates: Vec<WellPlanContext>,
        plan: &Plan,
        risk: Option<&mut (dyn RiskStrategy + 'static)>,
        cluster_ordered: bool,
    ) -> Result<Vec<WellPlanContext>, PlanError> {
        if cluster_ordered {
            candidates = earliest_per_cluster(candidates);
        }

        if let Some(r) = risk {
            for candidate in &mut candidates {
                r.apply_risk(candidate);
            }
        }

        for candidate in &mut candidates {
            self.cost.compute(candidate)?;
        }

        Ok(candidates
            .into_iter()
            .filter(|c| !self.constraints.is_violated(plan, c))
            .collect())
    }

    fn select_best_candidate(
        &self,
        mut candidates: Vec<WellPlanContext>,
        keep_order: bool,
        rng: &mut StdRng,
    ) -> WellPlanContext {
        debug_assert!(!candidates.is_empty());

        if keep_order {
            let idx = candidates
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.well.init_entry_date.unwrap_or(NaiveDate::MIN))
                .map(|(i, _)| i)
                .unwrap_or(0);
            return candidates.swap_remove(idx);
        }

        self.annealing_selection(&mut candidates, rng)
    }

    /// Simulated annealing over candidate scores. Small candidate sets use
    /// a cheap biased coin instead of a full anneal.
    fn annealing_selection(
        &self,
        candidates: &mut Vec<WellPlanContext>,
        rng: &mut StdRng,
    ) -> WellPlanContext {
        let valid: Vec<usize> = (0..candidates.len())
            .filter(|&i| candidates[i].cost.is_some())
            .collect();
        if valid.is_empty() {
            return candidates.swap_remove(0);
        }

        if valid.len() <= 3 {
            let idx = if rng.gen::<f64>() < 0.6 {
                valid
                    .iter()
                    .copied()
                    .max_by(|&a, &b| {
                        self.candidate_score(&candidates[a], rng)
                            .total_cmp(&self.candidate_score(&candidates[b], rng))
                    })
                    .unwrap_or(valid[0])
            } else {
                valid[rng.gen_range(0..valid.len())]
            };
            debug!(well = %candidates[idx].well.name, "annealing (small set) selected");
            return candidates.swap_remove(idx);
        }

        let mut current = valid[rng.gen_range(0..valid.len())];
        let mut current_score = self.candidate_score(&candidates[current], rng);
        let mut best = current;
        let mut best_score = current_score;

        let mut temp = self.selection.initial_temp;
        while temp > self.selection.min_temp {
            for _ in 0..self.selection.iterations_per_temp {
                let neighbor = self.neighbor_candidate(candidates, &valid, current, rng);
                let neighbor_score = self.candidate_score(&candidates[neighbor], rng);

                if accept_solution(current_score, neighbor_score, temp, rng) {
                    current = neighbor;
                    current_score = neighbor_score;
                    if current_score > best_score {
                        best = current;
                        best_score = current_score;
                    }
                }
            }
            temp *= self.selection.cooling_rate;
        }

        debug!(well = %candidates[best].well.name, "annealing selected");
        candidates.swap_remove(best)
    }

    /// Score = (NPV − co-located-crew penalty) × noise × entry-date factor.
    fn candidate_score(&self, candidate: &WellPlanContext, rng: &mut StdRng) -> f64 {
        let base = candidate.cost.unwrap_or(0.0);
        let penalty = if self.use_drill_team_penalty {
            candidate
                .metadata
                .get(meta::DRILL_TEAM_PENALTY)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        };
        let noise = rng.gen_range(0.95..=1.05);
        let time_factor = candidate.well.init_entry_date.map_or(1.0, |entry| {
            let days_from_start = (entry
                .and_hms_opt(0, 0, 0)
                .unwrap_or(self.start)
                - self.start)
                .num_days() as f64;
            (1.0 - days_from_start / 365.0).max(0.8)
        });
        (base - penalty) * noise * time_factor
    }

    /// 70% uniform jump, otherwise a jump within ±20% of the current cost.
    fn neighbor_candidate(
        &self,
        candidates: &[WellPlanContext],
        valid: &[usize],
        current: usize,
        rng: &mut StdRng,
    ) -> usize {
        if rng.gen::<f64>() < 0.7 {
            return valid[rng.gen_range(0..valid.len())];
        }

        let current_cost = candidates[current].cost.unwrap_or(0.0);
        let cost_range = current_cost.abs() * 0.2;
        let similar: Vec<usize> = valid
            .iter()
            .copied()
            .filter(|&i| (candidates[i].cost.unwrap_or(0.0) - current_cost).abs() <= cost_range)
            .collect();

        if similar.is_empty() {
            valid[rng.gen_range(0..valid.len())]
        } else {
            similar[rng.gen_range(0..similar.len())]
        }
    }
}

/// Metropolis acceptance: better scores always, worse ones with
/// probability `exp(delta / temp)`.
pub(crate) fn accept_solution(current: f64, new: f64, temp: f64, rng: &mut StdRng) -> bool {
    if new > current {
        return true;
    }
    if temp <= 0.0 {
        return false;
    }
    let probability = ((new - current) / temp).exp();
    rng.gen::<f64>() < probability
}

/// A cluster dependency is satisfied once no remaining well sits on it.
fn cluster_finished(dependency: Option<&str>, remaining: &[Well]) -> bool {
    match dependency {
        None => true,
        Some(cluster) => !remaining.iter().any(|w| w.cluster == cluster),
    }
}

/// Keep only the earliest-dated candidate of each cluster.
///
/// Keyed by a `BTreeMap` so the surviving candidates come out in a fixed
/// cluster order; the seeded selection RNG then walks the same sequence
/// on every compile.
fn earliest_per_cluster(candidates: Vec<WellPlanContext>) -> Vec<WellPlanContext> {
    let mut earliest: std::collections::BTreeMap<String, WellPlanContext> =
        std::collections::BTreeMap::new();
    for candidate in candidates {
        let date = candidate.well.init_entry_date.unwrap_or(NaiveDate::MIN);
        match earliest.entry(candidate.well.cluster.clone()) {
            std::collections::btree_map::Entry::Occupied(mut slot) => {
                let existing = slot.get().well.init_entry_date.unwrap_or(NaiveDate::MIN);
                if existing > date {
                    slot.insert(candidate);
                }
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }
    earliest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::well::test_support::well;
    use crate::core::{TaskKind, TeamPool};
    use crate::services::movement::SimpleMovement;
    use crate::services::{BaseCapex, BaseOpex, ClusterRandomRisk, Npv};
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn npv(start: NaiveDateTime) -> Box<dyn CostFunction> {
        let capex = BaseCapex::new(
            BTreeMap::from([
                ("ГС".to_string(), 23_300.0),
                ("ГС+ГРП".to_string(), 25_300.0),
            ]),
            2_500_000.0,
        );
        let opex = BaseOpex::new(109.9, 48.6, 3_093_900.0, 2_336_200.0);
        Box::new(Npv::new(13_896.0, start, Box::new(capex), Box::new(opex)))
    }

    fn drilling_manager(teams: usize) -> TeamManager {
        let mut pool = TeamPool::new();
        pool.add_teams(&[TaskKind::Drilling], teams);
        pool.add_teams(&[TaskKind::Gtm], teams);
        TeamManager::new(pool, Box::new(SimpleMovement))
    }

    #[test]
    fn compile_schedules_all_wells_inside_horizon() {
        let start = dt(2025, 1, 1);
        let end = dt(2035, 1, 1);
        let builder = PlanBuilder::new(start, end, npv(start));
        let wells = vec![
            well("W-1", "K-1", "ГС"),
            well("W-2", "K-2", "ГС+ГРП"),
            well("W-3", "K-3", "ГС"),
        ];

        let mut manager = drilling_manager(2);
        let mut rng = StdRng::seed_from_u64(42);
        let plan = builder
            .compile(&wells, &mut manager, None, CompileOptions::default(), &mut rng)
            .unwrap();

        assert_eq!(plan.well_plans.len(), 3);
        for wp in &plan.well_plans {
            assert!(wp.cost.is_some());
            assert!(wp.next_available_date() <= end);
            assert!(!wp.oil_profile.is_empty());
            // Entries chain in order.
            for pair in wp.entries.windows(2) {
                assert!(pair[1].start >= pair[0].end);
            }
        }
    }

    #[test]
    fn risk_strategy_is_threaded_through_the_whole_loop() {
        let start = dt(2025, 1, 1);
        let end = dt(2035, 1, 1);
        let builder = PlanBuilder::new(start, end, npv(start));
        let wells = vec![well("W-1", "K-1", "ГС"), well("W-2", "K-1", "ГС")];

        let mut manager = drilling_manager(2);
        let mut rng = StdRng::seed_from_u64(11);
        // Always triggers: the first commit writes off the whole pad.
        let mut risk = ClusterRandomRisk::with_rng(1.0, 1.0, StdRng::seed_from_u64(0));
        let plan = builder
            .compile(
                &wells,
                &mut manager,
                Some(&mut risk),
                CompileOptions::default(),
                &mut rng,
            )
            .unwrap();

        assert_eq!(plan.well_plans.len(), 2);
        // The second well on the pad produces nothing.
        let second = &plan.well_plans[1];
        assert!(second.oil_profile.iter().all(|oil| *oil == 0.0));
        assert_eq!(second.metadata.get(meta::APPLIED_RISK), Some(&1.0));
    }

    #[test]
    fn same_seed_reproduces_the_same_schedule() {
        let start = dt(2025, 1, 1);
        let end = dt(2035, 1, 1);
        let wells: Vec<Well> = (1..=6)
            .map(|i| well(&format!("W-{i}"), &format!("K-{}", (i % 3) + 1), "ГС"))
            .collect();

        let order = |seed: u64| -> Vec<String> {
            let builder = PlanBuilder::new(start, end, npv(start));
            let mut manager = drilling_manager(2);
            let mut rng = StdRng::seed_from_u64(seed);
            builder
                .compile(&wells, &mut manager, None, CompileOptions::default(), &mut rng)
                .unwrap()
                .well_plans
                .iter()
                .map(|wp| wp.well.name.clone())
                .collect()
        };

        assert_eq!(order(42), order(42));
        assert_eq!(order(7), order(7));
    }

    #[test]
    fn dependent_cluster_is_planned_after_its_dependency() {
        let start = dt(2025, 1, 1);
        let end = dt(2035, 1, 1);
        let builder = PlanBuilder::new(start, end, npv(start));

        let mut dependent = well("W-dep", "K-2", "ГС");
        dependent.depend_from_cluster = Some("K-1".to_string());
        let wells = vec![dependent, well("W-1", "K-1", "ГС"), well("W-2", "K-1", "ГС")];

        let mut manager = drilling_manager(2);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = builder
            .compile(&wells, &mut manager, None, CompileOptions::default(), &mut rng)
            .unwrap();

        assert_eq!(plan.well_plans.len(), 3);
        let position = |name: &str| {
            plan.well_plans
                .iter()
                .position(|wp| wp.well.name == name)
                .unwrap()
        };
        assert!(position("W-dep") > position("W-1"));
        assert!(position("W-dep") > position("W-2"));
    }

    #[test]
    fn keep_order_follows_entry_dates() {
        let start = dt(2025, 1, 1);
        let end = dt(2035, 1, 1);
        let builder = PlanBuilder::new(start, end, npv(start));

        let mut first = well("W-late", "K-1", "ГС");
        first.init_entry_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        let mut second = well("W-early", "K-2", "ГС");
        second.init_entry_date = NaiveDate::from_ymd_opt(2025, 2, 1);

        let mut manager = drilling_manager(2);
        let mut rng = StdRng::seed_from_u64(9);
        let options = CompileOptions {
            keep_order: true,
            cluster_ordered: true,
        };
        let plan = builder
            .compile(&[first, second], &mut manager, None, options, &mut rng)
            .unwrap();

        assert_eq!(plan.well_plans[0].well.name, "W-early");
    }

    #[test]
    fn horizon_too_short_yields_empty_plan() {
        let start = dt(2025, 1, 1);
        // 10 days cannot fit a 30-day drilling task plus travel.
        let end = dt(2025, 1, 10);
        let builder = PlanBuilder::new(start, end, npv(start));

        let mut manager = drilling_manager(1);
        let mut rng = StdRng::seed_from_u64(3);
        let plan = builder
            .compile(
                &[well("W-1", "K-1", "ГС")],
                &mut manager,
                None,
                CompileOptions::default(),
                &mut rng,
            )
            .unwrap();
        assert!(plan.well_plans.is_empty());
    }

    #[test]
    fn cluster_ordering_admits_one_candidate_per_cluster() {
        let mut a = well("W-1", "K-1", "ГС");
        a.init_entry_date = NaiveDate::from_ymd_opt(2025, 5, 1);
        let mut b = well("W-2", "K-1", "ГС");
        b.init_entry_date = NaiveDate::from_ymd_opt(2025, 2, 1);
        let c = well("W-3", "K-2", "ГС");

        let start = dt(2025, 1, 1);
        let contexts = vec![
            WellPlanContext::new(a, start, dt(2035, 1, 1)),
            WellPlanContext::new(b, start, dt(2035, 1, 1)),
            WellPlanContext::new(c, start, dt(2035, 1, 1)),
        ];
        let filtered = earliest_per_cluster(contexts);
        assert_eq!(filtered.len(), 2);
        let k1 = filtered
            .iter()
            .find(|ctx| ctx.well.cluster == "K-1")
            .unwrap();
        assert_eq!(k1.well.name, "W-2");
    }

    #[test]
    fn metropolis_always_accepts_improvements() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(accept_solution(1.0, 2.0, 0.0, &mut rng));
        assert!(!accept_solution(2.0, 1.0, 0.0, &mut rng));
        // At enormous temperature nearly everything is accepted.
        let accepted = (0..100)
            .filter(|_| accept_solution(2.0, 1.9, 1e9, &mut rng))
            .count();
        assert!(accepted > 90);
    }
}
