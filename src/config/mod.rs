//! Planner Configuration Module
//!
//! Provides project-wide configuration loaded from TOML files, replacing
//! hardcoded economics, crew and optimizer parameters with tunable values.
//!
//! ## Loading Order
//!
//! 1. `WELLPLAN_CONFIG` environment variable (path to TOML file)
//! 2. `wellplan.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(PlanConfig::load());
//!
//! // Anywhere in the codebase:
//! let price = config::get().economics.oil_price_per_tonne;
//! ```

mod plan_config;
pub mod defaults;
pub mod validation;

pub use plan_config::*;

use std::sync::OnceLock;

/// Global planner configuration, initialized once at startup.
static PLAN_CONFIG: OnceLock<PlanConfig> = OnceLock::new();

/// Initialize the global planner configuration.
///
/// Must be called exactly once before any calls to `get()`.
pub fn init(config: PlanConfig) {
    if PLAN_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global planner configuration.
///
/// Panics if `init()` has not been called. A missing config is a fatal
/// startup error, not a recoverable condition.
pub fn get() -> &'static PlanConfig {
    PLAN_CONFIG
        .get()
        .expect("config::get() called before config::init() — this is a startup bug")
}

/// Check whether the config has been initialized.
///
/// Useful for tests and optional config paths.
pub fn is_initialized() -> bool {
    PLAN_CONFIG.get().is_some()
}
