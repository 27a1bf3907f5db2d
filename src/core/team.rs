//! Crews and the pool they are drawn from.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{TaskCodeError, TaskKind};

/// A single crew, capable of one or more task kinds.
///
/// Identity is the generated id; two crews with identical capabilities are
/// still distinct resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub supported_tasks: BTreeSet<TaskKind>,
}

impl Team {
    pub fn new(supported_tasks: impl IntoIterator<Item = TaskKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            supported_tasks: supported_tasks.into_iter().collect(),
        }
    }

    pub fn supports(&self, task: TaskKind) -> bool {
        self.supported_tasks.contains(&task)
    }
}

/// Pool of crews indexed by the tasks they can perform.
#[derive(Debug, Clone, Default)]
pub struct TeamPool {
    task_teams: BTreeMap<TaskKind, Vec<Team>>,
}

impl TeamPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one crew supporting the given tasks.
    pub fn add_team(&mut self, supported_tasks: impl IntoIterator<Item = TaskKind>) {
        let tasks: BTreeSet<TaskKind> = supported_tasks.into_iter().collect();
        let team = Team {
            id: Uuid::new_v4(),
            supported_tasks: tasks.clone(),
        };
        for task in tasks {
            self.task_teams.entry(task).or_default().push(team.clone());
        }
    }

    /// Register `count` identical crews.
    pub fn add_teams(&mut self, supported_tasks: &[TaskKind], count: usize) {
        for _ in 0..count {
            self.add_team(supported_tasks.iter().copied());
        }
    }

    /// Register `count` crews from raw task codes (inventory spelling allowed).
    pub fn add_teams_from_codes(&mut self, codes: &[String], count: usize) -> Result<(), TaskCodeError> {
        let tasks = codes
            .iter()
            .map(|c| TaskKind::from_code(c))
            .collect::<Result<Vec<_>, _>>()?;
        self.add_teams(&tasks, count);
        Ok(())
    }

    /// Crews able to perform `task`, in registration order.
    pub fn teams_for_task(&self, task: TaskKind) -> &[Team] {
        self.task_teams.get(&task).map_or(&[], Vec::as_slice)
    }

    /// Task kinds covered by at least one crew.
    pub fn supported_tasks(&self) -> BTreeSet<TaskKind> {
        self.task_teams.keys().copied().collect()
    }

    /// All distinct crews in the pool.
    pub fn teams(&self) -> Vec<Team> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for team in self.task_teams.values().flatten() {
            if seen.insert(team.id) {
                out.push(team.clone());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.task_teams.is_empty()
    }
}
