//! airflowctl - manage Apache Airflow objects from the command line.
//!
//! Main entry point for the CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{dag, dag_run, health, pool, role, variable};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// airflowctl - manage Apache Airflow DAGs, runs, variables, pools and roles
#[derive(Parser)]
#[command(name = "airflowctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (layered over the discovered ones)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Airflow webserver URL
    #[arg(long, global = true, env = "AIRFLOW_BASE_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trigger, inspect and delete DAG runs
    DagRun(dag_run::DagRunArgs),

    /// Inspect, pause and delete DAGs
    Dag(dag::DagArgs),

    /// Manage variables
    Variable(variable::VariableArgs),

    /// Manage pools
    Pool(pool::PoolArgs),

    /// Manage roles
    Role(role::RoleArgs),

    /// Show metadatabase and scheduler health
    Health(health::HealthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "airflowctl=debug,airflow_provider=debug,airflow_client=debug,airflow_config=debug,info"
    } else {
        "airflowctl=info,airflow_provider=warn,airflow_client=warn,warn"
    };

    let log_dir = airflow_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "airflowctl.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "airflowctl=trace,airflow_provider=trace,airflow_client=trace,airflow_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        endpoint: cli.endpoint,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::DagRun(args) => dag_run::run(args, &ctx).await,
        Commands::Dag(args) => dag::run(args, &ctx).await,
        Commands::Variable(args) => variable::run(args, &ctx).await,
        Commands::Pool(args) => pool::run(args, &ctx).await,
        Commands::Role(args) => role::run(args, &ctx).await,
        Commands::Health(args) => health::run(args, &ctx).await,
    }
}
