//! CLI command handlers.

pub mod dag;
pub mod dag_run;
pub mod health;
pub mod pool;
pub mod role;
pub mod variable;

use std::path::PathBuf;

use airflow_provider::{Provider, ResourceConfig, ResourceState};
use anyhow::{Context as _, Result};
use console::{Style, style};
use tracing::{debug, warn};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file.
    pub config_path: Option<PathBuf>,
    /// Endpoint override from the command line or environment.
    pub endpoint: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load configuration and build a provider from it.
    pub fn provider(&self) -> Result<Provider> {
        let loaded = airflow_config::load_config(self.config_path.as_deref())
            .context("failed to load configuration")?;
        for warning in &loaded.warnings {
            warn!("{}", warning);
        }
        debug!(sources = ?loaded.loaded_from(), "configuration loaded");

        let mut config = loaded.config;
        if let Some(endpoint) = &self.endpoint {
            config.base_endpoint = Some(endpoint.clone());
        }
        let resolved = config.resolve().context("invalid configuration")?;
        debug!(
            endpoint = %resolved.base_endpoint,
            credentials = ?resolved.credentials,
            "configuration resolved"
        );

        Ok(Provider::from_config(&resolved)?)
    }
}

/// Create the resource, or update it in place if it already exists.
pub async fn upsert(
    provider: &Provider,
    id: &str,
    config: &ResourceConfig,
) -> Result<ResourceState> {
    let state = if provider.read(config.kind(), id).await?.is_some() {
        provider.update(id, config).await?
    } else {
        provider.create(config).await?
    };
    Ok(state)
}

/// Print a resource state as JSON or as an aligned attribute list.
pub fn print_state(state: &ResourceState, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    let title = format!("{} {}", state.kind(), state.id());
    println!();
    println!("{}", style(title).bold());
    println!("{}", dim.apply_to("─".repeat(40)));

    let value = serde_json::to_value(state)?;
    if let Some(fields) = value.as_object() {
        for (name, field) in fields.iter().filter(|(name, _)| name.as_str() != "type") {
            let rendered = match field {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            println!("  {} {}", dim.apply_to(format!("{:<16}", name)), rendered);
        }
    }
    println!();
    Ok(())
}

/// Print a one-line confirmation, or a JSON object for scripting.
pub fn print_done(message: &str, id: &str, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let output = serde_json::json!({ "id": id, "result": message });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let green = Style::new().green();
        println!("{} {} {}", green.apply_to("✓"), message, style(id).cyan());
    }
    Ok(())
}

/// Report that a resource does not exist and fail the command.
pub fn missing(kind: &str, id: &str) -> anyhow::Error {
    anyhow::anyhow!("{} '{}' not found", kind, id)
}
