//! Pool command - show, set and delete pools.

use airflow_provider::{PoolConfig, PoolState, ResourceConfig, ResourceKind, ResourceState};
use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, missing, print_done, print_state, upsert};

/// Arguments for the pool command.
#[derive(Args, Debug)]
pub struct PoolArgs {
    #[command(subcommand)]
    pub command: PoolCommand,
}

#[derive(Subcommand, Debug)]
pub enum PoolCommand {
    /// Show a pool and its slot usage
    Show { name: String },

    /// Create or resize a pool
    Set {
        name: String,

        /// Total slots
        #[arg(long)]
        slots: i32,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a pool
    Delete { name: String },
}

/// Run the pool command.
pub async fn run(args: PoolArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    match args.command {
        PoolCommand::Show { name } => match provider.read(ResourceKind::Pool, &name).await? {
            Some(state) => print_state(&state, ctx),
            None => Err(missing("pool", &name)),
        },
        PoolCommand::Set {
            name,
            slots,
            description,
        } => {
            let config = ResourceConfig::Pool(PoolConfig {
                name: name.clone(),
                slots,
                description,
            });
            let state = upsert(&provider, &name, &config).await?;
            print_state(&state, ctx)
        }
        PoolCommand::Delete { name } => {
            let state = ResourceState::Pool(PoolState {
                name,
                ..Default::default()
            });
            provider.delete(&state).await?;
            print_done("deleted", &state.id(), ctx)
        }
    }
}
