//! Well economics: CAPEX, OPEX and the NPV objective.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::core::{meta, TaskKind, Well, WellPlanContext};

#[derive(Debug, Error)]
pub enum CostError {
    #[error("no build cost configured for well type '{0}'")]
    UnknownWellType(String),
}

/// One-off construction cost of a well.
pub trait CapitalCost: Send + Sync {
    fn compute(&self, well: &Well) -> Result<f64, CostError>;
}

/// Monthly lifting cost for given oil/water volumes.
pub trait OperationalCost: Send + Sync {
    fn monthly(&self, monthly_oil: &[f64], monthly_water: &[f64]) -> Vec<f64>;
}

/// Objective function: annotate a context with its value.
pub trait CostFunction: Send + Sync {
    fn compute(&self, context: &mut WellPlanContext) -> Result<(), CostError>;
}

/// Length-proportional construction cost plus fixed surface equipment.
#[derive(Debug, Clone)]
pub struct BaseCapex {
    build_cost_per_metre: std::collections::BTreeMap<String, f64>,
    equipment_cost: f64,
}

impl BaseCapex {
    pub fn new(
        build_cost_per_metre: std::collections::BTreeMap<String, f64>,
        equipment_cost: f64,
    ) -> Self {
        Self {
            build_cost_per_metre,
            equipment_cost,
        }
    }
}

impl CapitalCost for BaseCapex {
    fn compute(&self, well: &Well) -> Result<f64, CostError> {
        let per_metre = self
            .build_cost_per_metre
            .get(&well.well_type)
            .ok_or_else(|| CostError::UnknownWellType(well.well_type.clone()))?;
        Ok(per_metre * well.length + self.equipment_cost)
    }
}

/// Per-tonne lifting costs plus flat monthly repair and maintenance.
///
/// Months with zero production carry zero cost (well shut in).
#[derive(Debug, Clone)]
pub struct BaseOpex {
    oil_cost_per_tonne: f64,
    water_cost_per_tonne: f64,
    repair_monthly: f64,
    maintain_monthly: f64,
}

impl BaseOpex {
    pub fn new(
        oil_cost_per_tonne: f64,
        water_cost_per_tonne: f64,
        repair_per_year: f64,
        maintain_per_year: f64,
    ) -> Self {
        Self {
            oil_cost_per_tonne,
            water_cost_per_tonne,
            repair_monthly: repair_per_year / 12.0,
            maintain_monthly: maintain_per_year / 12.0,
        }
    }
}

impl OperationalCost for BaseOpex {
    fn monthly(&self, monthly_oil: &[f64], monthly_water: &[f64]) -> Vec<f64> {
        monthly_oil
            .iter()
            .zip(monthly_water)
            .map(|(oil, water)| {
                if *oil == 0.0 && *water == 0.0 {
                    0.0
                } else {
                    oil * self.oil_cost_per_tonne
                        + water * self.water_cost_per_tonne
                        + self.repair_monthly
                        + self.maintain_monthly
                }
            })
            .collect()
    }
}

/// Net present value of a well: discounted cash flows minus discounted
/// CAPEX minus crew mobilization cost.
///
/// Writes `capex`, `cash_flow`, `travel_cost` and `drill_team_penalty`
/// into the context metadata for downstream constraints and scoring.
pub struct Npv {
    oil_price_per_tonne: f64,
    project_start: NaiveDateTime,
    capex: Box<dyn CapitalCost>,
    opex: Box<dyn OperationalCost>,
    discount_rate: f64,
    travel_cost_per_day: f64,
}

impl Npv {
    pub fn new(
        oil_price_per_tonne: f64,
        project_start: NaiveDateTime,
        capex: Box<dyn CapitalCost>,
        opex: Box<dyn OperationalCost>,
    ) -> Self {
        Self {
            oil_price_per_tonne,
            project_start,
            capex,
            opex,
            discount_rate: 0.125,
            travel_cost_per_day: 1_500_000.0,
        }
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_travel_cost_per_day(mut self, cost: f64) -> Self {
        self.travel_cost_per_day = cost;
        self
    }

    fn discount(&self, cash_flow: f64, years: f64) -> f64 {
        cash_flow / (1.0 + self.discount_rate).powf(years)
    }
}

impl CostFunction for Npv {
    fn compute(&self, context: &mut WellPlanContext) -> Result<(), CostError> {
        let shift_years =
            (context.next_available_date() - self.project_start).num_days() as f64 / 365.0;

        let capex = self.capex.compute(&context.well)?;

        let monthly_water: Vec<f64> = context
            .liq_profile
            .iter()
            .zip(&context.oil_profile)
            .map(|(liq, oil)| liq - oil)
            .collect();
        let monthly_opex = self.opex.monthly(&context.oil_profile, &monthly_water);

        let discounted_cash_flows: f64 = context
            .oil_profile
            .iter()
            .zip(&monthly_opex)
            .enumerate()
            .map(|(month, (oil, opex))| {
                let cash_flow = oil * self.oil_price_per_tonne - opex;
                self.discount(cash_flow, shift_years + month as f64 / 12.0)
            })
            .sum();
        let discounted_capex = self.discount(capex, shift_years);

        let travel_cost = context
            .entry_for_task(TaskKind::Drilling)
            .map_or(0.0, |entry| entry.travel_days * self.travel_cost_per_day);

        let drill_team_penalty = context
            .metadata
            .get(&meta::team_count_key(TaskKind::Drilling))
            .copied()
            .unwrap_or(0.0)
            * travel_cost;

        context.cost = Some(discounted_cash_flows - discounted_capex - travel_cost);
        context
            .metadata
            .insert(meta::TRAVEL_COST.to_string(), travel_cost);
        context
            .metadata
            .insert(meta::CASH_FLOW.to_string(), discounted_cash_flows);
        context
            .metadata
            .insert(meta::CAPEX.to_string(), discounted_capex);
        context
            .metadata
            .insert(meta::DRILL_TEAM_PENALTY.to_string(), drill_team_penalty);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::well::test_support::well;
    use crate::core::{ScheduleEntry, Team};
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn capex_scales_with_length() {
        let capex = BaseCapex::new(
            BTreeMap::from([("ГС".to_string(), 23_300.0)]),
            2_500_000.0,
        );
        let w = well("W-1", "K-1", "ГС");
        assert_eq!(capex.compute(&w).unwrap(), 23_300.0 * 3000.0 + 2_500_000.0);
    }

    #[test]
    fn capex_rejects_unpriced_well_type() {
        let capex = BaseCapex::new(BTreeMap::new(), 0.0);
        let w = well("W-1", "K-1", "ГС");
        assert!(matches!(
            capex.compute(&w),
            Err(CostError::UnknownWellType(t)) if t == "ГС"
        ));
    }

    #[test]
    fn opex_keeps_shut_in_months_free() {
        let opex = BaseOpex::new(100.0, 50.0, 1200.0, 2400.0);
        let costs = opex.monthly(&[10.0, 0.0], &[2.0, 0.0]);
        assert_eq!(costs[0], 10.0 * 100.0 + 2.0 * 50.0 + 100.0 + 200.0);
        assert_eq!(costs[1], 0.0);
    }

    #[test]
    fn npv_charges_drilling_travel() {
        let capex = BaseCapex::new(
            BTreeMap::from([("ГС".to_string(), 0.0)]),
            0.0,
        );
        let opex = BaseOpex::new(0.0, 0.0, 0.0, 0.0);
        let npv = Npv::new(1000.0, dt(2025, 1, 1), Box::new(capex), Box::new(opex))
            .with_discount_rate(0.0)
            .with_travel_cost_per_day(10.0);

        let mut ctx = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2026, 1, 1));
        ctx.entries.push(ScheduleEntry {
            task: TaskKind::Drilling,
            team: Team::new([TaskKind::Drilling]),
            start: dt(2025, 1, 1),
            end: dt(2025, 1, 1) + Duration::days(30),
            travel_days: 3.0,
        });
        ctx.oil_profile = vec![1.0, 1.0];
        ctx.liq_profile = vec![1.0, 1.0];

        npv.compute(&mut ctx).unwrap();
        // Zero discount: 2 tonnes * 1000 - 3 days * 10.
        assert_eq!(ctx.cost, Some(2000.0 - 30.0));
        assert_eq!(ctx.metadata.get(meta::TRAVEL_COST), Some(&30.0));
        assert_eq!(ctx.metadata.get(meta::CAPEX), Some(&0.0));
    }

    #[test]
    fn npv_discounts_later_launches_harder() {
        let make = || {
            let capex = BaseCapex::new(BTreeMap::from([("ГС".to_string(), 0.0)]), 0.0);
            let opex = BaseOpex::new(0.0, 0.0, 0.0, 0.0);
            Npv::new(1000.0, dt(2025, 1, 1), Box::new(capex), Box::new(opex))
                .with_travel_cost_per_day(0.0)
        };

        let mut early = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2030, 1, 1));
        early.oil_profile = vec![100.0];
        early.liq_profile = vec![100.0];
        make().compute(&mut early).unwrap();

        let mut late = WellPlanContext::new(well("W-2", "K-1", "ГС"), dt(2028, 1, 1), dt(2030, 1, 1));
        late.oil_profile = vec![100.0];
        late.liq_profile = vec![100.0];
        make().compute(&mut late).unwrap();

        assert!(early.cost.unwrap() > late.cost.unwrap());
    }
}
