use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Launcher and client for the calcgrid orchestrator.
#[derive(Parser, Debug)]
#[command(name = "calcgrid", version, about = "Distributed arithmetic evaluation")]
pub struct CliArgs {
    /// Orchestrator base URL (default: ORCHESTRATOR_URL or http://localhost:8080).
    /// For `run`, the spawned orchestrator binds this URL's port.
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the orchestrator, wait until it is healthy, then start an agent.
    Run {
        /// Path to the orchestrator binary (default: next to this executable)
        #[arg(long)]
        orchestrator_bin: Option<PathBuf>,

        /// Path to the agent binary (default: next to this executable)
        #[arg(long)]
        agent_bin: Option<PathBuf>,

        /// Maximum seconds to wait for the orchestrator to become healthy
        #[arg(long, default_value_t = 15)]
        ready_timeout: u64,
    },

    /// Submit an expression.
    Calc {
        expression: String,

        /// Poll until the expression finishes, for at most this many seconds
        #[arg(long)]
        wait: Option<u64>,
    },

    /// List all expressions.
    List,

    /// Show one expression.
    Get { id: String },
}
