//! wellplan - field development scheduling and NPV optimization
//!
//! # Usage
//!
//! ```bash
//! # First run: create the workspace, install the default config,
//! # verify the dataset and the engine
//! wellplan setup
//!
//! # Set up and immediately serve the dashboard
//! wellplan setup --run
//!
//! # Serve the dashboard (default command; runs setup when needed)
//! wellplan run
//!
//! # Compile a plan and write the schedule CSV without serving
//! wellplan plan --seed 42
//! ```
//!
//! # Environment Variables
//!
//! - `WELLPLAN_CONFIG`: Path to the config TOML (default: ./wellplan.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wellplan::api::{create_app, DashboardState};
use wellplan::bootstrap::{self, Workspace};
use wellplan::config::{self, PlanConfig};
use wellplan::core::Well;
use wellplan::data::{CsvWellLoader, PlanExporter};
use wellplan::planner;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wellplan")]
#[command(about = "Well plan optimization service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Initialize the workspace: install the default config if absent,
    /// check the well inventory and self-check the planning engine
    Setup {
        /// Serve the dashboard after a successful setup
        #[arg(long)]
        run: bool,
    },

    /// Serve the dashboard (the default command). Performs the full
    /// setup first when the workspace has never been initialized.
    Run,

    /// Compile a plan and export the schedule CSV, no server
    Plan {
        /// Fix the planner RNG for a reproducible schedule
        #[arg(long)]
        seed: Option<u64>,

        /// Run the whole-plan annealing refinement after the greedy build
        #[arg(long)]
        anneal: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let workspace = Workspace::default();

    match args.command.unwrap_or(SubCommand::Run) {
        SubCommand::Setup { run } => {
            let outcome = bootstrap::run_setup(&workspace).context("setup failed")?;
            println!("{}", bootstrap::banner(&outcome));
            if run {
                serve(outcome.config, outcome.wells, args.addr).await?;
            }
        }
        SubCommand::Run => {
            let (config, wells) = if workspace.is_initialized() {
                let config = PlanConfig::load();
                let wells = CsvWellLoader::new(&config.data.wells_path)
                    .load()
                    .with_context(|| {
                        format!(
                            "failed to load well inventory from {}",
                            config.data.wells_path.display()
                        )
                    })?;
                (config, wells)
            } else {
                info!("workspace not initialized, running setup first");
                let outcome = bootstrap::run_setup(&workspace).context("setup failed")?;
                println!("{}", bootstrap::banner(&outcome));
                (outcome.config, outcome.wells)
            };
            serve(config, wells, args.addr).await?;
        }
        SubCommand::Plan { seed, anneal } => {
            let mut config = PlanConfig::load();
            if anneal {
                config.annealing.enabled = true;
            }
            let wells = CsvWellLoader::new(&config.data.wells_path)
                .load()
                .with_context(|| {
                    format!(
                        "failed to load well inventory from {}",
                        config.data.wells_path.display()
                    )
                })?;

            let plan =
                planner::compile_from_config(&config, &wells, seed).context("compile failed")?;
            PlanExporter::save(&plan, &config.data.export_path).with_context(|| {
                format!("failed to export to {}", config.data.export_path.display())
            })?;

            println!(
                "planned {} wells | total NPV {:.0} | schedule written to {}",
                plan.well_plans.len(),
                plan.total_profit(),
                config.data.export_path.display()
            );
        }
    }

    Ok(())
}

/// Bind the dashboard and serve until Ctrl+C.
async fn serve(config: PlanConfig, wells: Vec<Well>, addr_override: Option<String>) -> Result<()> {
    let server_addr = addr_override.unwrap_or_else(|| config.server.addr.clone());

    info!(
        project = %config.project.name,
        wells = wells.len(),
        "starting dashboard"
    );
    if !config::is_initialized() {
        config::init(config.clone());
    }

    let state = DashboardState::new(config, wells);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("Dashboard available at http://{server_addr}");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}
