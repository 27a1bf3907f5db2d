//! Plan export as a launch schedule CSV.

use std::path::Path;

use chrono::Datelike;
use serde::Serialize;
use tracing::info;

use crate::core::{Plan, WellPlanContext};

use super::DataError;

#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    field: &'a str,
    cluster: &'a str,
    well: &'a str,
    layer: &'a str,
    purpose: &'a str,
    well_type: &'a str,
    liq_rate_tpd: f64,
    oil_rate_tpd: f64,
    entry_date: Option<chrono::NaiveDate>,
    entry_year: Option<i32>,
    length_m: f64,
}

/// Writes a compiled plan as one launch-schedule row per well.
pub struct PlanExporter;

impl PlanExporter {
    /// Serialize `plan` to CSV bytes, e.g. for an HTTP download.
    pub fn to_bytes(plan: &Plan) -> Result<Vec<u8>, DataError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for wp in &plan.well_plans {
            writer
                .serialize(Self::row(wp))
                .map_err(|e| DataError::Csv {
                    path: "<memory>".into(),
                    source: e,
                })?;
        }
        writer.into_inner().map_err(|e| DataError::Io {
            path: "<memory>".into(),
            source: e.into_error(),
        })
    }

    /// Write `plan` to `path`.
    pub fn save(plan: &Plan, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        let bytes = Self::to_bytes(plan)?;
        std::fs::write(path, bytes).map_err(|e| DataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!(wells = plan.well_plans.len(), path = %path.display(), "exported plan");
        Ok(())
    }

    fn row(wp: &WellPlanContext) -> ScheduleRow<'_> {
        // Scheduled wells launch when the last crew leaves; unscheduled
        // ones fall back to their requested entry date.
        let entry_date = wp
            .launch_date()
            .map(|dt| dt.date())
            .or(wp.well.init_entry_date);
        ScheduleRow {
            field: &wp.well.field,
            cluster: &wp.well.cluster,
            well: &wp.well.name,
            layer: &wp.well.layer,
            purpose: &wp.well.purpose,
            well_type: &wp.well.well_type,
            liq_rate_tpd: wp.well.liq_rate,
            oil_rate_tpd: wp.well.oil_rate,
            entry_date,
            entry_year: entry_date.map(|d| d.year()),
            length_m: wp.well.length,
        }
    }
}
