//! Dataset access: well inventory, measured profiles, plan export.

pub mod loader;
pub mod profiles;
pub mod saver;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::TaskCodeError;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("well '{well}' has an invalid well type: {source}")]
    InvalidWellType {
        well: String,
        #[source]
        source: TaskCodeError,
    },
    #[error("well inventory {path} is empty")]
    EmptyInventory { path: PathBuf },
}

pub use loader::CsvWellLoader;
pub use profiles::{ProfileStore, WellProfile};
pub use saver::PlanExporter;
