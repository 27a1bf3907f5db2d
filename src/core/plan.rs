//! Plans: scheduled wells with production profiles and economics.
//!
//! A [`WellPlanContext`] is one well plus everything the planner derived for
//! it: schedule entries, monthly production profiles and the computed NPV.
//! A [`Plan`] aggregates contexts and answers the yearly/monthly questions
//! the dashboard and constraints ask.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::TaskKind;
use super::team::Team;
use super::well::Well;

/// Metadata keys written by the planning services.
pub mod meta {
    /// Discounted capital expenditure of the well.
    pub const CAPEX: &str = "capex";
    /// Discounted cumulative cash flow of the well.
    pub const CASH_FLOW: &str = "cash_flow";
    /// Crew mobilization cost charged against the well.
    pub const TRAVEL_COST: &str = "travel_cost";
    /// Penalty for co-locating drilling crews on one pad.
    pub const DRILL_TEAM_PENALTY: &str = "drill_team_penalty";
    /// Production reduction applied by the risk strategy.
    pub const APPLIED_RISK: &str = "applied_risk";

    /// Per-task crew co-location counter key (`team_count_drilling`, ...).
    pub fn team_count_key(task: super::TaskKind) -> String {
        format!("team_count_{}", task.code().to_lowercase())
    }
}

/// First day of the month containing `date`.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub(crate) fn next_month(date: NaiveDate) -> NaiveDate {
    month_start(date) + Months::new(1)
}

/// One crew working one task on one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub task: TaskKind,
    pub team: Team,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Crew move-in time consumed before `start`, in days.
    pub travel_days: f64,
}

/// A well in the plan together with its schedule and derived profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellPlanContext {
    pub well: Well,
    /// Earliest date work on this well may start.
    pub start: NaiveDateTime,
    /// Planning horizon end.
    pub end: NaiveDateTime,
    pub entries: Vec<ScheduleEntry>,
    /// Computed objective value (NPV), once the cost function has run.
    pub cost: Option<f64>,
    /// Monthly oil production, tonnes, starting at the launch month.
    pub oil_profile: Vec<f64>,
    /// Monthly liquid production, tonnes, starting at the launch month.
    pub liq_profile: Vec<f64>,
    /// Numeric annotations written by planning services.
    pub metadata: BTreeMap<String, f64>,
}

impl WellPlanContext {
    pub fn new(well: Well, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            well,
            start,
            end,
            entries: Vec::new(),
            cost: None,
            oil_profile: Vec::new(),
            liq_profile: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// The date the well is free for the next task: the latest entry end,
    /// or the window start when nothing is scheduled yet.
    pub fn next_available_date(&self) -> NaiveDateTime {
        self.entries
            .iter()
            .map(|e| e.end)
            .max()
            .unwrap_or(self.start)
    }

    /// The date the well comes on stream. `None` until scheduled.
    pub fn launch_date(&self) -> Option<NaiveDateTime> {
        self.entries.iter().map(|e| e.end).max()
    }

    pub fn entry_for_task(&self, task: TaskKind) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.task == task)
    }

    /// Cumulative oil produced from launch up to `date`, tonnes.
    pub fn oil_production_until(&self, date: NaiveDateTime) -> f64 {
        self.production_until(date, &self.oil_profile)
    }

    /// Cumulative liquid produced from launch up to `date`, tonnes.
    pub fn liquid_production_until(&self, date: NaiveDateTime) -> f64 {
        self.production_until(date, &self.liq_profile)
    }

    fn production_until(&self, date: NaiveDateTime, profile: &[f64]) -> f64 {
        let well_start = self.next_available_date();
        if date < well_start {
            return 0.0;
        }

        let n_month = (date.year() - well_start.year()) * 12 + date.month() as i32
            - well_start.month() as i32
            + 1;
        let n_month = (n_month.max(0) as usize).min(profile.len());
        profile[..n_month].iter().sum()
    }
}

/// Bucket a monthly profile into calendar years, starting at the launch month.
pub fn monthly_to_yearly(launch: NaiveDateTime, profile: &[f64]) -> Vec<(i32, f64)> {
    let launch_year = launch.year();
    let launch_month = launch.month() as i32;
    profile
        .iter()
        .enumerate()
        .map(|(idx, value)| (launch_year + (launch_month + idx as i32 - 1) / 12, *value))
        .collect()
}

/// Tag each profile month with the first day of its calendar month.
pub fn monthly_dates(launch: NaiveDateTime, profile: &[f64]) -> Vec<(NaiveDate, f64)> {
    let mut month = month_start(launch.date());
    profile
        .iter()
        .map(|value| {
            let tagged = (month, *value);
            month = next_month(month);
            tagged
        })
        .collect()
}

/// A full development plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub well_plans: Vec<WellPlanContext>,
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

impl Plan {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            well_plans: Vec::new(),
        }
    }

    pub fn add_context(&mut self, context: WellPlanContext) {
        self.well_plans.push(context);
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.well_plans.iter().map(|wp| wp.start).min()
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        self.well_plans.iter().map(|wp| wp.end).max()
    }

    /// Sum of computed well NPVs.
    pub fn total_profit(&self) -> f64 {
        self.well_plans.iter().filter_map(|wp| wp.cost).sum()
    }

    pub fn mean_well_cost(&self) -> f64 {
        let costs: Vec<f64> = self.well_plans.iter().filter_map(|wp| wp.cost).collect();
        if costs.is_empty() {
            return 0.0;
        }
        costs.iter().sum::<f64>() / costs.len() as f64
    }

    pub fn well_cost(&self, name: &str) -> Option<f64> {
        self.well_plans
            .iter()
            .find(|wp| wp.well.name == name)
            .and_then(|wp| wp.cost)
    }

    pub fn all_entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.well_plans.iter().flat_map(|wp| wp.entries.iter())
    }

    /// Field-wide cumulative oil up to `date`, tonnes.
    pub fn oil_production_at(&self, date: NaiveDateTime) -> f64 {
        self.well_plans
            .iter()
            .map(|wp| wp.oil_production_until(date))
            .sum()
    }

    /// Field-wide cumulative liquid up to `date`, tonnes.
    pub fn liquid_production_at(&self, date: NaiveDateTime) -> f64 {
        self.well_plans
            .iter()
            .map(|wp| wp.liquid_production_until(date))
            .sum()
    }

    fn aggregate<K: Ord, F>(&self, mut extractor: F) -> BTreeMap<K, f64>
    where
        F: FnMut(&WellPlanContext, NaiveDateTime) -> Vec<(K, f64)>,
    {
        let mut out: BTreeMap<K, f64> = BTreeMap::new();
        for wp in &self.well_plans {
            // Unscheduled contexts have no launch date and contribute nothing.
            let Some(launch) = wp.launch_date() else {
                continue;
            };
            for (key, value) in extractor(wp, launch) {
                *out.entry(key).or_insert(0.0) += value;
            }
        }
        out
    }

    /// Oil production per calendar year, tonnes.
    pub fn oil_per_year(&self) -> BTreeMap<i32, f64> {
        self.aggregate(|wp, launch| monthly_to_yearly(launch, &wp.oil_profile))
    }

    /// Oil produced by wells in their launch year only.
    pub fn oil_per_year_new_wells(&self) -> BTreeMap<i32, f64> {
        self.aggregate(|wp, launch| {
            monthly_to_yearly(launch, &wp.oil_profile)
                .into_iter()
                .filter(|(year, _)| *year == launch.year())
                .collect()
        })
    }

    /// Oil produced by wells after their launch year.
    pub fn oil_per_year_existing_wells(&self) -> BTreeMap<i32, f64> {
        self.aggregate(|wp, launch| {
            monthly_to_yearly(launch, &wp.oil_profile)
                .into_iter()
                .filter(|(year, _)| *year > launch.year())
                .collect()
        })
    }

    /// Number of wells launched per calendar year.
    pub fn well_starts_per_year(&self) -> BTreeMap<i32, u32> {
        self.aggregate(|_, launch| vec![(launch.year(), 1.0)])
            .into_iter()
            .map(|(year, count)| (year, count as u32))
            .collect()
    }

    /// Average launch-cohort oil production per year.
    pub fn mean_oil_per_year(&self) -> BTreeMap<i32, f64> {
        let totals = self.oil_per_year();
        self.well_starts_per_year()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .filter_map(|(year, count)| {
                totals
                    .get(&year)
                    .map(|total| (year, total / f64::from(count)))
            })
            .collect()
    }

    /// Discounted CAPEX per launch year.
    pub fn capex_per_year(&self) -> BTreeMap<i32, f64> {
        self.aggregate(|wp, launch| {
            vec![(
                launch.year(),
                wp.metadata.get(meta::CAPEX).copied().unwrap_or(0.0),
            )]
        })
    }

    /// Oil production per calendar month, tonnes.
    pub fn oil_per_month(&self) -> BTreeMap<NaiveDate, f64> {
        self.aggregate(|wp, launch| monthly_dates(launch, &wp.oil_profile))
    }

    /// Monthly oil from wells still in their launch year.
    pub fn oil_per_month_new_wells(&self) -> BTreeMap<NaiveDate, f64> {
        self.aggregate(|wp, launch| {
            monthly_dates(launch, &wp.oil_profile)
                .into_iter()
                .filter(|(month, _)| month.year() == launch.year())
                .collect()
        })
    }

    /// Monthly oil from wells past their launch year.
    pub fn oil_per_month_existing_wells(&self) -> BTreeMap<NaiveDate, f64> {
        self.aggregate(|wp, launch| {
            monthly_dates(launch, &wp.oil_profile)
                .into_iter()
                .filter(|(month, _)| month.year() > launch.year())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::well::test_support::well;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn planned_context(launch: NaiveDateTime, oil: Vec<f64>) -> WellPlanContext {
        let mut ctx = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 1, 1), dt(2035, 1, 1));
        ctx.entries.push(ScheduleEntry {
            task: TaskKind::Drilling,
            team: Team::new([TaskKind::Drilling]),
            start: launch - chrono::Duration::days(30),
            end: launch,
            travel_days: 1.0,
        });
        ctx.oil_profile = oil;
        ctx
    }

    #[test]
    fn next_available_date_falls_back_to_window_start() {
        let ctx = WellPlanContext::new(well("W-1", "K-1", "ГС"), dt(2025, 3, 1), dt(2035, 1, 1));
        assert_eq!(ctx.next_available_date(), dt(2025, 3, 1));
        assert_eq!(ctx.launch_date(), None);
    }

    #[test]
    fn cumulative_production_clamps_to_profile_length() {
        let ctx = planned_context(dt(2025, 6, 15), vec![100.0, 80.0, 60.0]);
        assert_eq!(ctx.oil_production_until(dt(2025, 5, 1)), 0.0);
        assert_eq!(ctx.oil_production_until(dt(2025, 6, 20)), 100.0);
        assert_eq!(ctx.oil_production_until(dt(2025, 7, 1)), 180.0);
        // Far beyond the profile: whole profile counted once.
        assert_eq!(ctx.oil_production_until(dt(2030, 1, 1)), 240.0);
    }

    #[test]
    fn yearly_bucketing_splits_at_calendar_boundary() {
        // Launch in November: months fall in Nov, Dec, Jan.
        let buckets = monthly_to_yearly(dt(2025, 11, 10), &[10.0, 20.0, 30.0]);
        assert_eq!(buckets, vec![(2025, 10.0), (2025, 20.0), (2026, 30.0)]);
    }

    #[test]
    fn monthly_dates_walk_month_starts() {
        let dates = monthly_dates(dt(2025, 12, 5), &[1.0, 2.0]);
        assert_eq!(
            dates,
            vec![
                (NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(), 1.0),
                (NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 2.0),
            ]
        );
    }

    #[test]
    fn plan_aggregates_split_new_and_existing_wells() {
        let mut plan = Plan::new();
        plan.add_context(planned_context(dt(2025, 11, 1), vec![10.0, 20.0, 30.0]));
        plan.add_context(planned_context(dt(2026, 2, 1), vec![5.0]));

        let totals = plan.oil_per_year();
        assert_eq!(totals.get(&2025), Some(&30.0));
        assert_eq!(totals.get(&2026), Some(&35.0));

        let new_wells = plan.oil_per_year_new_wells();
        assert_eq!(new_wells.get(&2025), Some(&30.0));
        assert_eq!(new_wells.get(&2026), Some(&5.0));

        let existing = plan.oil_per_year_existing_wells();
        assert_eq!(existing.get(&2026), Some(&30.0));

        let starts = plan.well_starts_per_year();
        assert_eq!(starts.get(&2025), Some(&1));
        assert_eq!(starts.get(&2026), Some(&1));
    }

    #[test]
    fn unscheduled_context_is_excluded_from_aggregates() {
        let mut plan = Plan::new();
        plan.add_context(WellPlanContext::new(
            well("W-x", "K-1", "ГС"),
            dt(2025, 1, 1),
            dt(2035, 1, 1),
        ));
        assert!(plan.oil_per_year().is_empty());
        assert!(plan.well_starts_per_year().is_empty());
    }

    #[test]
    fn profit_totals_skip_uncosted_wells() {
        let mut plan = Plan::new();
        let mut a = planned_context(dt(2025, 6, 1), vec![]);
        a.cost = Some(1000.0);
        let b = planned_context(dt(2025, 7, 1), vec![]);
        plan.add_context(a);
        plan.add_context(b);

        assert_eq!(plan.total_profit(), 1000.0);
        assert_eq!(plan.mean_well_cost(), 1000.0);
        assert_eq!(plan.well_cost("W-1"), Some(1000.0));
        assert_eq!(plan.well_cost("missing"), None);
    }
}
