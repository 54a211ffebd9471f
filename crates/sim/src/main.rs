//! Headless battle simulator.
//!
//! Runs one AI-versus-AI battle on the built-in demo roster and prints the
//! result as JSON on stdout. Logs go to stderr and follow `RUST_LOG`.
mod config;
mod content;

use anyhow::Result;
use battle_runtime::{AiController, BattleContext, Event, RuntimeConfig, Topic};
use tracing::info;

use crate::config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let runtime_config = RuntimeConfig::from_env();
    let sim_config = SimConfig::from_env();
    info!(
        target: "battle::sim",
        seed = runtime_config.seed,
        enemies = sim_config.roster_size,
        "Starting simulation"
    );

    let mut ctx = BattleContext::builder()
        .config(runtime_config)
        .content(content::demo_content())
        .roster(content::demo_roster(sim_config.roster_size))
        .friendly_controller(AiController::new())
        .hostile_controller(AiController::new())
        .build()?;

    if sim_config.print_events {
        for topic in [Topic::Turn, Topic::Action, Topic::Battle] {
            ctx.listen(topic, log_event);
        }
    }

    let result = ctx.run().await;
    info!(
        target: "battle::sim",
        status = %result.status,
        rounds = result.rounds,
        experience = result.experience,
        "Simulation finished"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn log_event(event: Event) {
    match serde_json::to_string(&event) {
        Ok(line) => info!(target: "battle::sim", topic = ?event.topic(), "{line}"),
        Err(error) => tracing::warn!(target: "battle::sim", %error, "Failed to encode event"),
    }
}
