//! Business-plan constraints: yearly oil and CAPEX ceilings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{meta, monthly_to_yearly, Plan, WellPlanContext};

/// A ceiling value, optionally scoped to one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintBound {
    pub value: f64,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Picks the tightest bound applicable to `year`: a year-specific bound
/// and the general bound compete, the lower value wins.
pub fn applicable_bound(bounds: &[ConstraintBound], year: i32) -> Option<&ConstraintBound> {
    let min_specific = bounds
        .iter()
        .filter(|b| b.year == Some(year))
        .min_by(|a, b| a.value.total_cmp(&b.value));
    let min_general = bounds
        .iter()
        .filter(|b| b.year.is_none())
        .min_by(|a, b| a.value.total_cmp(&b.value));

    match (min_specific, min_general) {
        (Some(s), Some(g)) => Some(if s.value <= g.value { s } else { g }),
        (s, g) => s.or(g),
    }
}

/// A plan-level admission rule for candidate wells.
pub trait Constraint: Send + Sync {
    fn bounds(&self) -> &[ConstraintBound];

    /// Would admitting `context` into `plan` break this constraint?
    fn is_violated(&self, plan: &Plan, context: &WellPlanContext) -> bool;
}

/// Yearly oil production ceiling, tonnes.
#[derive(Debug, Clone)]
pub struct OilConstraint {
    bounds: Vec<ConstraintBound>,
}

impl OilConstraint {
    pub fn new(bounds: Vec<ConstraintBound>) -> Self {
        Self { bounds }
    }
}

impl Constraint for OilConstraint {
    fn bounds(&self) -> &[ConstraintBound] {
        &self.bounds
    }

    fn is_violated(&self, plan: &Plan, context: &WellPlanContext) -> bool {
        let Some(launch) = context.launch_date() else {
            return false;
        };

        let mut candidate_oil: BTreeMap<i32, f64> = BTreeMap::new();
        for (year, oil) in monthly_to_yearly(launch, &context.oil_profile) {
            *candidate_oil.entry(year).or_insert(0.0) += oil;
        }

        let planned_oil = plan.oil_per_year();
        for (year, oil) in candidate_oil {
            let Some(bound) = applicable_bound(&self.bounds, year) else {
                continue;
            };
            let total = planned_oil.get(&year).copied().unwrap_or(0.0) + oil;
            if total > bound.value {
                debug!(
                    well = %context.well.name,
                    year,
                    total,
                    bound = bound.value,
                    "oil constraint violated"
                );
                return true;
            }
        }
        false
    }
}

/// Yearly discounted-CAPEX ceiling.
#[derive(Debug, Clone)]
pub struct CapexConstraint {
    bounds: Vec<ConstraintBound>,
}

impl CapexConstraint {
    pub fn new(bounds: Vec<ConstraintBound>) -> Self {
        Self { bounds }
    }
}

impl Constraint for CapexConstraint {
    fn bounds(&self) -> &[ConstraintBound] {
        &self.bounds
    }

    fn is_violated(&self, plan: &Plan, context: &WellPlanContext) -> bool {
        let Some(launch) = context.launch_date() else {
            return false;
        };
        let launch_year = chrono::Datelike::year(&launch);

        let candidate_capex = context.metadata.get(meta::CAPEX).copied().unwrap_or(0.0);
        if candidate_capex == 0.0 {
            return false;
        }

        let Some(bound) = applicable_bound(&self.bounds, launch_year) else {
            return false;
        };

        let planned = plan
            .capex_per_year()
            .get(&launch_year)
            .copied()
            .unwrap_or(0.0);
        planned + candidate_capex > bound.value
    }
}

/// All constraints of a plan, plus the period boundaries they imply.
#[derive(Default)]
pub struct ConstraintManager {
    constraints: Vec<Box<dyn Constraint>>,
    time_bounds: Vec<i32>,
}

impl ConstraintManager {
    pub fn new(constraints: Vec<Box<dyn Constraint>>) -> Self {
        let mut years: Vec<i32> = constraints
            .iter()
            .flat_map(|c| c.bounds().iter().filter_map(|b| b.year))
            .collect();
        years.sort_unstable();
        years.dedup();
        Self {
            constraints,
            time_bounds: years,
        }
    }

    /// Sorted years that carry year-specific bounds.
    pub fn time_bounds(&self) -> &[i32] {
        &self.time_bounds
    }

    /// The next constraint period boundary strictly after `current_year`.
    pub fn period_end(&self, current_year: i32) -> Option<i32> {
        self.time_bounds
            .iter()
            .copied()
            .find(|year| *year > current_year)
    }

    pub fn is_violated(&self, plan: &Plan, context: &WellPlanContext) -> bool {
        self.constraints
            .iter()
            .any(|c| c.is_violated(plan, context))
    }
}
