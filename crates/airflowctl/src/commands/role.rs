//! Role command - show, set and delete roles.

use airflow_provider::{
    Permission, ResourceConfig, ResourceKind, ResourceState, RoleConfig, RoleState,
};
use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, missing, print_done, print_state, upsert};

/// Arguments for the role command.
#[derive(Args, Debug)]
pub struct RoleArgs {
    #[command(subcommand)]
    pub command: RoleCommand,
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// Show a role and its permissions
    Show { name: String },

    /// Create a role or replace its permissions
    Set {
        name: String,

        /// Granted permission, repeatable (e.g. can_read:DAGs)
        #[arg(short, long = "permission", value_name = "ACTION:RESOURCE", value_parser = parse_permission)]
        permissions: Vec<Permission>,
    },

    /// Delete a role
    Delete { name: String },
}

/// Run the role command.
pub async fn run(args: RoleArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    match args.command {
        RoleCommand::Show { name } => match provider.read(ResourceKind::Role, &name).await? {
            Some(state) => print_state(&state, ctx),
            None => Err(missing("role", &name)),
        },
        RoleCommand::Set { name, permissions } => {
            let config = ResourceConfig::Role(RoleConfig {
                name: name.clone(),
                actions: permissions.into_iter().collect(),
            });
            let state = upsert(&provider, &name, &config).await?;
            print_state(&state, ctx)
        }
        RoleCommand::Delete { name } => {
            let state = ResourceState::Role(RoleState {
                name,
                ..Default::default()
            });
            provider.delete(&state).await?;
            print_done("deleted", &state.id(), ctx)
        }
    }
}

/// Parse `ACTION:RESOURCE`. Resource names may themselves contain `:`
/// (`DAG:sales_etl`), so only the first one separates.
fn parse_permission(s: &str) -> std::result::Result<Permission, String> {
    match s.split_once(':') {
        Some((action, resource)) if !action.is_empty() && !resource.is_empty() => {
            Ok(Permission::new(action, resource))
        }
        _ => Err(format!("expected ACTION:RESOURCE, got `{}`", s)),
    }
}
