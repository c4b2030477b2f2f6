mod cli;
mod launcher;
mod server_client;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{CliArgs, Command};
use crate::launcher::{sibling_binary, LaunchPlan};
use crate::server_client::{render, ServerClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    calcgrid_core::config::load_dotenv();
    let config = calcgrid_core::Config::from_env().context("failed to load configuration")?;
    let url = args.url.unwrap_or(config.agent.orchestrator_url);
    let client = ServerClient::new(&url);

    match args.command {
        Command::Run {
            orchestrator_bin,
            agent_bin,
            ready_timeout,
        } => {
            let plan = LaunchPlan {
                orchestrator: match orchestrator_bin {
                    Some(p) => p,
                    None => sibling_binary("orchestrator")?,
                },
                agent: match agent_bin {
                    Some(p) => p,
                    None => sibling_binary("agent")?,
                },
                orchestrator_url: url,
                profile: config.profile.clone(),
                ready_timeout: Duration::from_secs(ready_timeout),
            };
            launcher::run(plan).await?;
        }
        Command::Calc { expression, wait } => {
            let id = client.calculate(&expression).await?;
            match wait {
                Some(secs) => {
                    let expr = client.wait_for(&id, Duration::from_secs(secs)).await?;
                    println!("{}", render(&expr));
                }
                None => println!("{}", id),
            }
        }
        Command::List => {
            for expr in client.expressions().await? {
                println!("{}", render(&expr));
            }
        }
        Command::Get { id } => match client.expression(&id).await? {
            Some(expr) => println!("{}", render(&expr)),
            None => anyhow::bail!("expression {} not found", id),
        },
    }

    Ok(())
}
