//! DAG command - inspect, pause and delete DAGs.

use airflow_provider::{DagConfig, DagState, ResourceConfig, ResourceKind, ResourceState};
use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, missing, print_done, print_state};

/// Arguments for the dag command.
#[derive(Args, Debug)]
pub struct DagArgs {
    #[command(subcommand)]
    pub command: DagCommand,
}

#[derive(Subcommand, Debug)]
pub enum DagCommand {
    /// Show a DAG
    Show { dag_id: String },

    /// Pause a DAG
    Pause { dag_id: String },

    /// Unpause a DAG
    Unpause { dag_id: String },

    /// Delete a DAG and all of its metadata
    Delete { dag_id: String },
}

/// Run the dag command.
pub async fn run(args: DagArgs, ctx: &Context) -> Result<()> {
    match args.command {
        DagCommand::Show { dag_id } => cmd_show(&dag_id, ctx).await,
        DagCommand::Pause { dag_id } => cmd_set_paused(dag_id, true, ctx).await,
        DagCommand::Unpause { dag_id } => cmd_set_paused(dag_id, false, ctx).await,
        DagCommand::Delete { dag_id } => cmd_delete(dag_id, ctx).await,
    }
}

async fn cmd_show(dag_id: &str, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    match provider.read(ResourceKind::Dag, dag_id).await? {
        Some(state) => print_state(&state, ctx),
        None => Err(missing("DAG", dag_id)),
    }
}

async fn cmd_set_paused(dag_id: String, is_paused: bool, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    let config = ResourceConfig::Dag(DagConfig {
        dag_id,
        is_paused,
        delete_dag: false,
    });
    let state = provider.create(&config).await?;
    print_state(&state, ctx)
}

async fn cmd_delete(dag_id: String, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    let state = ResourceState::Dag(DagState {
        dag_id,
        delete_dag: true,
        ..Default::default()
    });
    provider.delete(&state).await?;
    print_done("deleted", &state.id(), ctx)
}
