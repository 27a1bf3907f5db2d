//! Well inventory record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::{TaskCodeError, TaskKind};

/// A candidate well from the development inventory.
///
/// Rates are tonnes per day; `length` is the absolute wellbore length in
/// metres. The `well_type` string carries the task codes joined by `+`
/// (e.g. `"ГС+ГРП"` means drill, then frac).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    pub name: String,
    pub cluster: String,
    pub field: String,
    pub layer: String,
    pub purpose: String,
    pub well_type: String,
    /// Oil flow rate, tonnes per day.
    pub oil_rate: f64,
    /// Liquid flow rate, tonnes per day.
    pub liq_rate: f64,
    /// Absolute well length, metres.
    pub length: f64,
    /// Entry date from the original business plan, when known.
    #[serde(default)]
    pub init_entry_date: Option<NaiveDate>,
    /// Date the pad infrastructure becomes available.
    #[serde(default)]
    pub readiness_date: Option<NaiveDate>,
    /// The well may only be planned once this whole cluster is planned.
    #[serde(default)]
    pub depend_from_cluster: Option<String>,
}

impl Well {
    /// Decompose the well type into its ordered tasks.
    pub fn tasks(&self) -> Result<Vec<TaskKind>, TaskCodeError> {
        self.well_type
            .split('+')
            .map(TaskKind::from_code)
            .collect()
    }
}
