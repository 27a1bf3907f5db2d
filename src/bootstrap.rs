//! First-run setup and preflight checks.
//!
//! `wellplan setup` walks a fixed sequence of guard steps; each one either
//! passes or aborts the whole run. The same sequence backs `wellplan run`
//! when the workspace has never been initialized.
//!
//! Order matters and is load-bearing: the dataset check runs before the
//! engine self-check, and the self-check runs before the completion
//! banner, so a failure always points at the first broken layer.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, PlanConfig};
use crate::core::Well;
use crate::data::{CsvWellLoader, DataError};
use crate::planner::{self, PlannerError};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create workspace directory {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration step failed: {0}")]
    Config(#[from] ConfigError),
    #[error("well inventory check failed, expected dataset at {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: DataError,
    },
    #[error("engine self-check failed: {0}")]
    SelfCheck(#[from] PlannerError),
}

/// Whether a setup step found its target already in place or created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Present,
    Installed,
}

/// Filesystem layout the planner expects around the working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Scratch directory for exports and caches.
    pub root: PathBuf,
    /// Planner configuration file.
    pub config_path: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".wellplan"),
            config_path: PathBuf::from("wellplan.toml"),
        }
    }
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_path: config_path.into(),
        }
    }

    /// `run` skips setup when this holds.
    pub fn is_initialized(&self) -> bool {
        self.root.is_dir()
    }
}

/// Everything setup verified, handed to the caller so `run` does not
/// reload it.
#[derive(Debug)]
pub struct SetupOutcome {
    pub workspace_dir: StepStatus,
    pub config_file: StepStatus,
    pub config: PlanConfig,
    pub wells: Vec<Well>,
    /// NPV of the one-well self-check plan.
    pub self_check_profit: f64,
}

/// Run the full setup sequence. Fail-fast: the first broken step aborts.
pub fn run_setup(workspace: &Workspace) -> Result<SetupOutcome, SetupError> {
    // 1. Workspace directory.
    let workspace_dir = if workspace.root.is_dir() {
        info!(path = %workspace.root.display(), "workspace directory present");
        StepStatus::Present
    } else {
        std::fs::create_dir_all(&workspace.root).map_err(|e| SetupError::Workspace {
            path: workspace.root.clone(),
            source: e,
        })?;
        info!(path = %workspace.root.display(), "workspace directory created");
        StepStatus::Installed
    };

    // 2. Configuration: install defaults only when absent.
    let (config_file, config) = if workspace.config_path.exists() {
        info!(path = %workspace.config_path.display(), "config present, skipping install");
        (
            StepStatus::Present,
            PlanConfig::load_from_file(&workspace.config_path)?,
        )
    } else {
        let config = PlanConfig::default();
        config.save_to_file(&workspace.config_path)?;
        info!(path = %workspace.config_path.display(), "default config installed");
        (StepStatus::Installed, config)
    };

    // 3. Well inventory. Must fail before the engine self-check so a bad
    //    dataset is reported as a dataset problem.
    let wells = CsvWellLoader::new(&config.data.wells_path)
        .load()
        .map_err(|e| SetupError::Dataset {
            path: config.data.wells_path.clone(),
            source: e,
        })?;

    // 4. Engine self-check: one well through the full default pipeline.
    let sample = &wells[..1];
    let plan = planner::compile_from_config(&config, sample, Some(0))?;
    let self_check_profit = plan.total_profit();
    info!(profit = self_check_profit, "engine self-check passed");

    Ok(SetupOutcome {
        workspace_dir,
        config_file,
        config,
        wells,
        self_check_profit,
    })
}

/// Completion banner for the terminal, printed only after every check
/// has passed.
pub fn banner(outcome: &SetupOutcome) -> String {
    format!(
        "== {} ==\n\
         workspace: {}\n\
         config:    {} ({})\n\
         wells:     {} loaded from {}\n\
         self-check NPV: {:.0}\n\
         setup complete",
        outcome.config.project.name,
        status_word(outcome.workspace_dir),
        status_word(outcome.config_file),
        outcome.config.server.addr,
        outcome.wells.len(),
        outcome.config.data.wells_path.display(),
        outcome.self_check_profit,
    )
}

fn status_word(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Present => "present",
        StepStatus::Installed => "installed",
    }
}
