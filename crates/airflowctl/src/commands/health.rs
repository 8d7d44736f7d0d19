//! Health command - shows metadatabase and scheduler status.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the health command.
#[derive(Args, Debug)]
pub struct HealthArgs {}

/// Run the health command.
pub async fn run(_args: HealthArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider()?;
    let health = provider.client().health().check().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Airflow Health").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!();
        for (name, component) in [
            ("Metadatabase:", &health.metadatabase),
            ("Scheduler:", &health.scheduler),
        ] {
            let status = component.status.as_deref().unwrap_or("unknown");
            let marker = if status == "healthy" {
                Style::new().green().apply_to(format!("● {}", status))
            } else {
                Style::new().red().apply_to(format!("● {}", status))
            };
            println!("  {} {}", dim.apply_to(format!("{:<14}", name)), marker);
        }
        println!(
            "  {} {}",
            dim.apply_to(format!("{:<14}", "Server:")),
            provider.client().api_root()
        );
        println!();
    }

    if !health.is_healthy() {
        bail!("Airflow reports unhealthy components");
    }
    Ok(())
}
