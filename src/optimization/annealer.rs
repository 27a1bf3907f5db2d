//! Whole-plan simulated annealing.
//!
//! Refines a compiled plan by perturbing it (swap wells, shift schedules,
//! reassign crews) and accepting perturbations by the Metropolis rule on
//! total profit.

use chrono::Duration;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::builder::accept_solution;
use crate::core::Plan;
use crate::services::TeamManager;

#[derive(Debug, Clone, Copy)]
pub struct AnnealingPlanner {
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub min_temp: f64,
    pub iterations: usize,
}

impl Default for AnnealingPlanner {
    fn default() -> Self {
        Self {
            initial_temp: 1000.0,
            cooling_rate: 0.95,
            min_temp: 1.0,
            iterations: 100,
        }
    }
}

impl AnnealingPlanner {
    pub fn new(initial_temp: f64, cooling_rate: f64, min_temp: f64, iterations: usize) -> Self {
        Self {
            initial_temp,
            cooling_rate,
            min_temp,
            iterations,
        }
    }

    /// Anneal `plan`, returning the best plan encountered.
    pub fn optimize(&self, plan: &Plan, manager: &mut TeamManager, rng: &mut StdRng) -> Plan {
        let mut current = plan.clone();
        let mut best = plan.clone();
        let mut current_profit = current.total_profit();
        let mut best_profit = current_profit;

        let mut temp = self.initial_temp;
        while temp > self.min_temp {
            for _ in 0..self.iterations {
                let neighbor = self.neighbor(&current, manager, rng);
                let neighbor_profit = neighbor.total_profit();

                if accept_solution(current_profit, neighbor_profit, temp, rng) {
                    current = neighbor;
                    current_profit = neighbor_profit;
                    if current_profit > best_profit {
                        best = current.clone();
                        best_profit = current_profit;
                    }
                }
            }
            temp *= self.cooling_rate;
        }

        debug!(profit = best_profit, "annealing complete");
        best
    }

    fn neighbor(&self, plan: &Plan, manager: &mut TeamManager, rng: &mut StdRng) -> Plan {
        let mut neighbor = plan.clone();
        if neighbor.well_plans.is_empty() {
            return neighbor;
        }

        match rng.gen_range(0..3u8) {
            // Swap two wells in plan order.
            0 if neighbor.well_plans.len() > 1 => {
                let a = rng.gen_range(0..neighbor.well_plans.len());
                let b = rng.gen_range(0..neighbor.well_plans.len());
                neighbor.well_plans.swap(a, b);
            }
            // Shift one well's schedule by up to a month either way.
            1 => {
                let idx = rng.gen_range(0..neighbor.well_plans.len());
                let shift = Duration::days(rng.gen_range(-30..=30));
                for entry in &mut neighbor.well_plans[idx].entries {
                    entry.start += shift;
                    entry.end += shift;
                }
            }
            // Hand one entry to another capable crew.
            2 => {
                let idx = rng.gen_range(0..neighbor.well_plans.len());
                let wp = &mut neighbor.well_plans[idx];
                if !wp.entries.is_empty() {
                    let entry_idx = rng.gen_range(0..wp.entries.len());
                    let task = wp.entries[entry_idx].task;
                    let teams = manager.pool().teams_for_task(task);
                    if !teams.is_empty() {
                        wp.entries[entry_idx].team = teams[rng.gen_range(0..teams.len())].clone();
                    }
                }
            }
            _ => {}
        }

        // Replay crew commitments so availability reflects the mutation.
        for wp in &neighbor.well_plans {
            manager.assign(wp);
        }

        neighbor
    }
}
