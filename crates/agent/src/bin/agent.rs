//! agent: polls the orchestrator for tasks and computes them.
//!
//! Settings come from the environment (and `.env`); flags override them.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use calcgrid_agent::{HttpTaskSource, WorkerPool};

/// Calcgrid worker agent.
#[derive(Parser, Debug)]
#[command(name = "agent", version, about)]
struct Cli {
    /// Orchestrator base URL (default: ORCHESTRATOR_URL).
    #[arg(long)]
    orchestrator_url: Option<String>,

    /// Number of concurrent pollers (default: COMPUTING_POWER).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    computing_power: Option<u32>,

    /// Back-off between polls in milliseconds (default: AGENT_BACKOFF_MS).
    #[arg(long)]
    backoff_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    calcgrid_core::config::load_dotenv();
    let mut config = calcgrid_core::Config::from_env()?;
    if let Some(url) = cli.orchestrator_url {
        config.agent.orchestrator_url = url;
    }
    if let Some(n) = cli.computing_power {
        config.agent.computing_power = n as usize;
    }
    if let Some(ms) = cli.backoff_ms {
        config.agent.backoff_ms = ms;
    }
    config.log_summary();

    let source = Arc::new(HttpTaskSource::new(&config.agent.orchestrator_url));
    info!(endpoint = source.endpoint(), "polling orchestrator");
    let pool = Arc::new(WorkerPool::new(source, &config.agent));

    let runner = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move { pool.run().await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, finishing in-flight tasks");
    pool.stop();
    runner.await?;

    Ok(())
}
