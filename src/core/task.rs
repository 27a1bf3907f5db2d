//! Well construction task kinds.
//!
//! A well type string such as `"ГС+ГРП"` decomposes into an ordered list of
//! tasks, each with a fixed crew-occupancy duration. Task codes accept the
//! field-report aliases used in well inventory spreadsheets.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A task code that matched neither a canonical name nor a known alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task code: {0}")]
pub struct TaskCodeError(pub String);

/// Kind of work a crew performs on a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    /// Drilling a new wellbore (horizontal, directional or multilateral).
    Drilling,
    /// Well intervention / stimulation (hydraulic fracturing).
    Gtm,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Drilling, TaskKind::Gtm];

    /// Canonical code, matching the inventory column values.
    pub fn code(self) -> &'static str {
        match self {
            TaskKind::Drilling => "DRILLING",
            TaskKind::Gtm => "GTM",
        }
    }

    /// Field-report aliases accepted by [`TaskKind::from_code`].
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TaskKind::Drilling => &["ГС", "ННС", "МЗС"],
            TaskKind::Gtm => &["ГРП"],
        }
    }

    /// Nominal crew occupancy for one well.
    pub fn duration(self) -> Duration {
        match self {
            TaskKind::Drilling => Duration::days(30),
            TaskKind::Gtm => Duration::days(20),
        }
    }

    /// Parse a task code, case-insensitively, over canonical names and aliases.
    pub fn from_code(code: &str) -> Result<Self, TaskCodeError> {
        let normalized = code.trim().to_uppercase();
        for task in Self::ALL {
            if normalized == task.code() || task.aliases().contains(&normalized.as_str()) {
                return Ok(task);
            }
        }
        Err(TaskCodeError(code.trim().to_string()))
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_codes_parse() {
        assert_eq!(TaskKind::from_code("DRILLING").unwrap(), TaskKind::Drilling);
        assert_eq!(TaskKind::from_code("gtm").unwrap(), TaskKind::Gtm);
    }

    #[test]
    fn aliases_parse_case_insensitively() {
        assert_eq!(TaskKind::from_code("гс").unwrap(), TaskKind::Drilling);
        assert_eq!(TaskKind::from_code("МЗС").unwrap(), TaskKind::Drilling);
        assert_eq!(TaskKind::from_code(" грп ").unwrap(), TaskKind::Gtm);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = TaskKind::from_code("КРС").unwrap_err();
        assert_eq!(err, TaskCodeError("КРС".to_string()));
    }

    #[test]
    fn durations_match_crew_occupancy() {
        assert_eq!(TaskKind::Drilling.duration(), Duration::days(30));
        assert_eq!(TaskKind::Gtm.duration(), Duration::days(20));
    }
}
