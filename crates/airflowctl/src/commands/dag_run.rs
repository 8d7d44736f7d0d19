//! DAG run command - trigger runs and wait for them to finish.

use std::time::Duration;

use airflow_provider::{
    Deletion, ResourceKind, RunClient, RunHandle, RunParams, RunStatus, TriggerOutcome,
};
use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Context, missing, print_done, print_state};

/// Arguments for the dag-run command.
#[derive(Args, Debug)]
pub struct DagRunArgs {
    #[command(subcommand)]
    pub command: DagRunCommand,
}

#[derive(Subcommand, Debug)]
pub enum DagRunCommand {
    /// Trigger a DAG run and wait until it succeeds
    Trigger {
        /// DAG to run
        dag_id: String,

        /// Explicit run id (generated by Airflow if omitted)
        #[arg(long)]
        run_id: Option<String>,

        /// Logical date (ISO 8601)
        #[arg(long)]
        logical_date: Option<String>,

        /// Run configuration entry, repeatable
        #[arg(long = "conf", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        conf: Vec<(String, String)>,

        /// Seconds to wait for the run (default from config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Return as soon as the run is created
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the current state of a run
    Status {
        /// Run handle (DAG-ID:DAG-RUN-ID)
        handle: String,
    },

    /// Delete a run
    Delete {
        /// Run handle (DAG-ID:DAG-RUN-ID)
        handle: String,
    },
}

/// Trigger result for JSON output.
#[derive(Debug, Serialize)]
struct TriggerOutput {
    handle: String,
    status: Option<RunStatus>,
    error: Option<String>,
}

/// Run the dag-run command.
pub async fn run(args: DagRunArgs, ctx: &Context) -> Result<()> {
    match args.command {
        DagRunCommand::Trigger {
            dag_id,
            run_id,
            logical_date,
            conf,
            timeout,
            no_wait,
        } => {
            let params = RunParams {
                run_id,
                logical_date,
                conf: conf.into_iter().collect(),
            };
            cmd_trigger(&dag_id, params, timeout, no_wait, ctx).await
        }
        DagRunCommand::Status { handle } => cmd_status(&handle, ctx).await,
        DagRunCommand::Delete { handle } => cmd_delete(&handle, ctx).await,
    }
}

async fn cmd_trigger(
    dag_id: &str,
    params: RunParams,
    timeout: Option<u64>,
    no_wait: bool,
    ctx: &Context,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let provider = ctx.provider()?.with_cancellation(cancel.clone());

    if no_wait {
        RunHandle::validate_parent(dag_id)?;
        let run_id = provider.client().start_run(dag_id, &params).await?;
        let handle = RunHandle::encode(dag_id, run_id)?;
        return print_done("triggered", &handle.to_string(), ctx);
    }

    let mut wait = provider.wait_spec().clone();
    if let Some(secs) = timeout {
        wait = wait.with_timeout(Duration::from_secs(secs));
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling wait");
            cancel.cancel();
        }
    });

    if !ctx.json_output {
        let dim = Style::new().dim();
        println!(
            "{}",
            dim.apply_to(format!(
                "Triggering {} (timeout {}s)...",
                dag_id,
                wait.timeout.as_secs()
            ))
        );
    }

    let outcome = provider.lifecycle().trigger(dag_id, params, &wait).await?;
    report_outcome(outcome, ctx)
}

fn report_outcome(outcome: TriggerOutcome, ctx: &Context) -> Result<()> {
    let handle = outcome.handle.to_string();
    let output = TriggerOutput {
        handle: handle.clone(),
        status: outcome.result.as_ref().ok().cloned(),
        error: outcome.result.as_ref().err().map(|e| e.to_string()),
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        println!("  {} {}", dim.apply_to("Handle:"), style(&handle).cyan());
        match &outcome.result {
            Ok(status) => {
                let green = Style::new().green();
                println!("  {} {}", dim.apply_to("Status:"), green.apply_to(status));
            }
            Err(_) => {
                let red = Style::new().red();
                println!("  {} {}", dim.apply_to("Status:"), red.apply_to("did not finish"));
            }
        }
    }

    match outcome.result {
        Ok(_) => Ok(()),
        Err(e) => bail!("run {} did not succeed: {}", handle, e),
    }
}

async fn cmd_status(handle: &str, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    match provider.read(ResourceKind::DagRun, handle).await? {
        Some(state) => print_state(&state, ctx),
        None => Err(missing("DAG run", handle)),
    }
}

async fn cmd_delete(handle: &str, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    let handle = RunHandle::decode(handle)?;
    let deletion = provider.lifecycle().delete(&handle).await?;
    let message = match deletion {
        Deletion::Deleted => "deleted",
        Deletion::AlreadyGone => "already gone",
    };
    print_done(message, &handle.to_string(), ctx)
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}
