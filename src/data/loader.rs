//! Well inventory loading.
//!
//! The inventory is a CSV file with one row per candidate well. Optional
//! columns may be left blank; missing lengths are imputed with the mean
//! of the known ones, matching how incomplete inventories arrive.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::Well;

use super::DataError;

#[derive(Debug, Deserialize)]
struct WellRecord {
    name: String,
    cluster: String,
    field: String,
    layer: String,
    purpose: String,
    well_type: String,
    oil_rate: f64,
    liq_rate: f64,
    length: Option<f64>,
    #[serde(default)]
    init_entry_date: Option<NaiveDate>,
    #[serde(default)]
    depend_from_cluster: Option<String>,
    #[serde(default)]
    readiness_date: Option<NaiveDate>,
}

pub struct CsvWellLoader {
    path: PathBuf,
}

impl CsvWellLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Well>, DataError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| DataError::Csv {
            path: self.path.clone(),
            source: e,
        })?;

        let mut records = Vec::new();
        for record in reader.deserialize::<WellRecord>() {
            records.push(record.map_err(|e| DataError::Csv {
                path: self.path.clone(),
                source: e,
            })?);
        }

        if records.is_empty() {
            return Err(DataError::EmptyInventory {
                path: self.path.clone(),
            });
        }

        let known_lengths: Vec<f64> = records.iter().filter_map(|r| r.length).collect();
        let mean_length = if known_lengths.is_empty() {
            0.0
        } else {
            known_lengths.iter().sum::<f64>() / known_lengths.len() as f64
        };
        let missing = records.len() - known_lengths.len();
        if missing > 0 {
            warn!(missing, mean_length, "imputing missing well lengths");
        }

        let wells: Vec<Well> = records
            .into_iter()
            .map(|r| Well {
                name: r.name,
                cluster: r.cluster,
                field: r.field,
                layer: r.layer,
                purpose: r.purpose,
                well_type: r.well_type,
                oil_rate: r.oil_rate,
                liq_rate: r.liq_rate,
                length: r.length.unwrap_or(mean_length),
                init_entry_date: r.init_entry_date,
                readiness_date: r.readiness_date,
                depend_from_cluster: r.depend_from_cluster,
            })
            .collect();

        for well in &wells {
            well.tasks().map_err(|e| DataError::InvalidWellType {
                well: well.name.clone(),
                source: e,
            })?;
        }

        info!(count = wells.len(), path = %self.path.display(), "loaded well inventory");
        Ok(wells)
    }
}
