//! Crew scheduling: availability tracking, travel time and yearly limits.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

use crate::core::{meta, ScheduleEntry, TaskCodeError, TaskKind, Team, TeamPool, WellPlanContext};

use super::movement::Movement;

#[derive(Debug, Error)]
pub enum TeamError {
    #[error(transparent)]
    TaskCode(#[from] TaskCodeError),
    #[error("task '{0}' is not supported by any crew in the pool")]
    UnsupportedTask(TaskKind),
}

/// Maximum distinct crews per task kind, per calendar year.
pub type YearlyLimits = BTreeMap<i32, BTreeMap<TaskKind, usize>>;

/// Where a crew is and when it frees up.
#[derive(Debug, Clone)]
struct TeamState {
    available_from: NaiveDateTime,
    current_cluster: Option<String>,
}

impl Default for TeamState {
    fn default() -> Self {
        Self {
            available_from: NaiveDateTime::MIN,
            current_cluster: None,
        }
    }
}

/// Assigns crews to well tasks, earliest finish first.
///
/// `get_assignments` proposes a schedule for a candidate without touching
/// crew state; `assign` commits a chosen candidate, advancing crew
/// availability and recording yearly usage.
pub struct TeamManager {
    pool: TeamPool,
    movement: Box<dyn Movement>,
    teams_by_id: HashMap<Uuid, Team>,
    states: HashMap<Uuid, TeamState>,
    count_colocated: bool,
    limits: YearlyLimits,
    usage: BTreeMap<i32, BTreeMap<TaskKind, HashSet<Uuid>>>,
}

impl TeamManager {
    pub fn new(pool: TeamPool, movement: Box<dyn Movement>) -> Self {
        let teams_by_id: HashMap<Uuid, Team> =
            pool.teams().into_iter().map(|t| (t.id, t)).collect();
        let states = teams_by_id
            .keys()
            .map(|id| (*id, TeamState::default()))
            .collect();
        Self {
            pool,
            movement,
            teams_by_id,
            states,
            count_colocated: true,
            limits: YearlyLimits::new(),
            usage: BTreeMap::new(),
        }
    }

    pub fn with_limits(mut self, limits: YearlyLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_colocation_count(mut self, enabled: bool) -> Self {
        self.count_colocated = enabled;
        self
    }

    pub fn pool(&self) -> &TeamPool {
        &self.pool
    }

    /// Propose schedule entries for every task of the context's well.
    ///
    /// Tasks chain: each starts no earlier than the previous entry's end.
    /// Crew state is not modified.
    pub fn get_assignments(&self, context: &mut WellPlanContext) -> Result<(), TeamError> {
        let tasks = context.well.tasks()?;
        let supported = self.pool.supported_tasks();

        for task in tasks {
            if !supported.contains(&task) {
                return Err(TeamError::UnsupportedTask(task));
            }

            let mut best: Option<(NaiveDateTime, NaiveDateTime, Team, f64)> = None;
            for team in self.pool.teams_for_task(task) {
                let state = &self.states[&team.id];
                let travel_days = self
                    .movement
                    .move_days(state.current_cluster.as_deref(), &context.well.cluster);
                let start = self.find_available_start(task, team, travel_days, context);
                let end = start + task.duration();

                let better = match &best {
                    Some((_, best_end, _, _)) => end < *best_end,
                    None => true,
                };
                if better {
                    best = Some((start, end, team.clone(), travel_days));
                }
            }

            if let Some((start, end, team, travel_days)) = best {
                let team_id = team.id;
                context.entries.push(ScheduleEntry {
                    task,
                    team,
                    start,
                    end,
                    travel_days,
                });
                if self.count_colocated {
                    let count = self.colocated_count(&context.well.cluster, Some(task), team_id);
                    context
                        .metadata
                        .insert(meta::team_count_key(task), count as f64);
                }
            }
        }

        Ok(())
    }

    /// Commit a candidate: advance crew availability and record usage.
    pub fn assign(&mut self, context: &WellPlanContext) {
        for entry in &context.entries {
            self.states.insert(
                entry.team.id,
                TeamState {
                    available_from: entry.end,
                    current_cluster: Some(context.well.cluster.clone()),
                },
            );
            self.record_usage(entry.task, entry.start.year(), &entry.team);
        }
    }

    /// Earliest start honoring crew availability, travel and yearly limits.
    ///
    /// When the year's crew limit for the task is exhausted, the start is
    /// pushed to January 1 of the next year; years without a configured
    /// limit always admit.
    fn find_available_start(
        &self,
        task: TaskKind,
        team: &Team,
        travel_days: f64,
        context: &WellPlanContext,
    ) -> NaiveDateTime {
        let travel = Duration::seconds((travel_days * 86_400.0) as i64);
        let base = (self.states[&team.id].available_from + travel)
            .max(context.next_available_date());

        // Terminates: years past the last limited year always admit.
        let mut start = base;
        loop {
            let year = start.year();
            if self.check_limit(task, year, team) {
                return start;
            }
            start = NaiveDate::from_ymd_opt(year + 1, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or(start);
        }
    }

    /// Would assigning `team` to `task` in `year` respect the crew limit?
    fn check_limit(&self, task: TaskKind, year: i32, team: &Team) -> bool {
        let Some(max_count) = self.limits.get(&year).and_then(|l| l.get(&task)) else {
            return true;
        };

        let used = self
            .usage
            .get(&year)
            .and_then(|by_task| by_task.get(&task));
        match used {
            // A crew already counted this year may keep working.
            Some(teams) if teams.contains(&team.id) => true,
            Some(teams) => teams.len() < *max_count,
            None => *max_count > 0,
        }
    }

    /// Record crew usage for the assignment year and every later limited year:
    /// a crew mobilized in 2026 still occupies a slot in 2027's budget.
    fn record_usage(&mut self, task: TaskKind, assignment_year: i32, team: &Team) {
        let relevant_years: Vec<i32> = self
            .limits
            .range(assignment_year..)
            .filter(|(_, by_task)| by_task.contains_key(&task))
            .map(|(year, _)| *year)
            .collect();

        for year in relevant_years {
            if self.check_limit(task, year, team) {
                self.usage
                    .entry(year)
                    .or_default()
                    .entry(task)
                    .or_default()
                    .insert(team.id);
            }
        }
    }

    /// Other crews currently sitting on `cluster` that could do `task`.
    fn colocated_count(&self, cluster: &str, task: Option<TaskKind>, exclude: Uuid) -> usize {
        self.states
            .iter()
            .filter(|(id, state)| {
                **id != exclude
                    && state.current_cluster.as_deref() == Some(cluster)
                    && task.map_or(true, |t| {
                        self.teams_by_id
                            .get(*id)
                            .map_or(false, |team| team.supports(t))
                    })
            })
            .count()
    }
}
