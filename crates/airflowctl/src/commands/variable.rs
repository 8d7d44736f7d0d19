//! Variable command - get, set and delete variables.
//!
//! Honours the configured variable backend, so with
//! `variable_backend = "local"` this edits `airflow_variables.json` instead
//! of calling Airflow.

use airflow_provider::{ResourceConfig, ResourceKind, ResourceState, VariableConfig};
use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, missing, print_done, upsert};

/// Arguments for the variable command.
#[derive(Args, Debug)]
pub struct VariableArgs {
    #[command(subcommand)]
    pub command: VariableCommand,
}

#[derive(Subcommand, Debug)]
pub enum VariableCommand {
    /// Print a variable's value
    Get { key: String },

    /// Create or update a variable
    Set {
        key: String,
        value: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a variable
    Delete { key: String },
}

/// Run the variable command.
pub async fn run(args: VariableArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    match args.command {
        VariableCommand::Get { key } => {
            let Some(ResourceState::Variable(var)) =
                provider.read(ResourceKind::Variable, &key).await?
            else {
                return Err(missing("variable", &key));
            };
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&var)?);
            } else {
                println!("{}", var.value);
            }
            Ok(())
        }
        VariableCommand::Set {
            key,
            value,
            description,
        } => {
            let config = ResourceConfig::Variable(VariableConfig {
                key: key.clone(),
                value,
                description,
            });
            upsert(&provider, &key, &config).await?;
            print_done("set", &key, ctx)
        }
        VariableCommand::Delete { key } => {
            let state = ResourceState::Variable(airflow_provider::VariableState {
                key,
                ..Default::default()
            });
            provider.delete(&state).await?;
            print_done("deleted", &state.id(), ctx)
        }
    }
}
