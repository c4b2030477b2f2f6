//! `calcgrid run`: orchestrator + agent process supervision.
//!
//! The orchestrator starts first; the agent starts only once `/health`
//! answers. Ctrl-C or either child exiting brings both down.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::server_client::{HealthInfo, ServerClient};

/// Interval between readiness probes.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct LaunchPlan {
    pub orchestrator: PathBuf,
    pub agent: PathBuf,
    pub orchestrator_url: String,
    /// Config profile, so the port override also wins over `{PROFILE}_ORCHESTRATOR_PORT`.
    pub profile: String,
    pub ready_timeout: Duration,
}

/// Path of a binary installed next to the running executable.
pub fn sibling_binary(name: &str) -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    let file = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
    Ok(exe.with_file_name(file))
}

/// Environment for the spawned orchestrator: bind the port `url` points at.
pub fn orchestrator_env(url: &str, profile: &str) -> Result<Vec<(String, String)>> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid orchestrator URL '{}'", url))?;
    let Some(port) = parsed.port_or_known_default() else {
        bail!("orchestrator URL '{}' has no port", url);
    };
    let port = port.to_string();
    let mut env = vec![("ORCHESTRATOR_PORT".to_string(), port.clone())];
    if !profile.is_empty() {
        env.push((format!("{}_ORCHESTRATOR_PORT", profile), port));
    }
    Ok(env)
}

fn spawn(path: &Path, args: &[&str], env: &[(String, String)]) -> Result<Child> {
    Command::new(path)
        .args(args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start {}", path.display()))
}

/// Probe `/health` every [`READY_POLL_INTERVAL`] until it answers or
/// `timeout` elapses.
pub async fn wait_until_ready(client: &ServerClient, timeout: Duration) -> Result<HealthInfo> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match client.health().await {
            Ok(health) => return Ok(health),
            Err(e) if tokio::time::Instant::now() >= deadline => {
                bail!("orchestrator not ready after {:?}: {:#}", timeout, e)
            }
            Err(_) => tokio::time::sleep(READY_POLL_INTERVAL).await,
        }
    }
}

fn report(name: &str, status: std::io::Result<ExitStatus>) {
    match status {
        Ok(s) if s.success() => info!("{} exited cleanly", name),
        Ok(s) => warn!("{} exited with {}", name, s),
        Err(e) => warn!("failed to wait for {}: {}", name, e),
    }
}

pub async fn run(plan: LaunchPlan) -> Result<()> {
    info!(bin = %plan.orchestrator.display(), "starting orchestrator");
    let env = orchestrator_env(&plan.orchestrator_url, &plan.profile)?;
    let mut orchestrator = spawn(&plan.orchestrator, &[], &env)?;

    let client = ServerClient::new(&plan.orchestrator_url);
    let ready = tokio::select! {
        ready = wait_until_ready(&client, plan.ready_timeout) => ready,
        status = orchestrator.wait() => {
            report("orchestrator", status);
            bail!("orchestrator exited before becoming ready");
        }
    };
    let health = match ready {
        Ok(health) => health,
        Err(e) => {
            orchestrator.start_kill().ok();
            report("orchestrator", orchestrator.wait().await);
            return Err(e);
        }
    };
    info!(
        status = %health.status,
        version = %health.version,
        pending_tasks = health.pending_tasks,
        "orchestrator ready"
    );

    info!(bin = %plan.agent.display(), "starting agent");
    let mut agent = match spawn(&plan.agent, &["--orchestrator-url", &plan.orchestrator_url], &[]) {
        Ok(child) => child,
        Err(e) => {
            orchestrator.start_kill().ok();
            report("orchestrator", orchestrator.wait().await);
            return Err(e);
        }
    };

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("shutting down processes");
        }
        status = orchestrator.wait() => report("orchestrator", status),
        status = agent.wait() => report("agent", status),
    }

    agent.start_kill().ok();
    orchestrator.start_kill().ok();
    agent.wait().await.ok();
    orchestrator.wait().await.ok();
    info!("all processes stopped");
    Ok(())
}
