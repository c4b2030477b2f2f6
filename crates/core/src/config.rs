use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::task::Operation;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Profile-aware key lookup: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
struct Source<'a, F: Fn(&str) -> Option<String>> {
    profile: &'a str,
    lookup: F,
}

impl<'a, F: Fn(&str) -> Option<String>> Source<'a, F> {
    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = (self.lookup)(&prefixed).filter(|s| !s.is_empty()) {
                return Some(v);
            }
        }
        (self.lookup)(key).filter(|s| !s.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a present value; a value that does not parse is an error, not a default.
    fn parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.opt(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub agent: AgentConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CALCGRID_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env::var("CALCGRID_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, |key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (used by tests and embedders).
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile.to_uppercase();
        let source = Source { profile: &p, lookup };
        Ok(Self {
            profile: p.clone(),
            server: ServerConfig::from_source(&source)?,
            agent: AgentConfig::from_source(&source)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:  bind={}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  agent:   url={}, computing_power={}, backoff={}ms",
            self.agent.orchestrator_url,
            self.agent.computing_power,
            self.agent.backoff_ms
        );
        tracing::info!(
            "  timings: +{}ms -{}ms *{}ms /{}ms",
            self.agent.timings.addition_ms,
            self.agent.timings.subtraction_ms,
            self.agent.timings.multiplication_ms,
            self.agent.timings.division_ms
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_source<F: Fn(&str) -> Option<String>>(s: &Source<'_, F>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: s.or("ORCHESTRATOR_HOST", "0.0.0.0"),
            port: s.parsed("ORCHESTRATOR_PORT", 8080)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

// ── Agent ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub orchestrator_url: String,
    /// Number of concurrent pollers (and in-flight operations).
    pub computing_power: usize,
    /// Fixed back-off between poll iterations.
    pub backoff_ms: u64,
    pub timings: OperationTimings,
}

impl AgentConfig {
    fn from_source<F: Fn(&str) -> Option<String>>(s: &Source<'_, F>) -> Result<Self, ConfigError> {
        let computing_power: usize = s.parsed("COMPUTING_POWER", 4)?;
        if computing_power == 0 {
            return Err(ConfigError::InvalidValue {
                key: "COMPUTING_POWER".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(Self {
            orchestrator_url: s.or("ORCHESTRATOR_URL", "http://localhost:8080"),
            computing_power,
            backoff_ms: s.parsed("AGENT_BACKOFF_MS", 1000)?,
            timings: OperationTimings {
                addition_ms: s.parsed("TIME_ADDITION_MS", 1000)?,
                subtraction_ms: s.parsed("TIME_SUBTRACTION_MS", 1000)?,
                multiplication_ms: s.parsed("TIME_MULTIPLICATIONS_MS", 1000)?,
                division_ms: s.parsed("TIME_DIVISIONS_MS", 1000)?,
            },
        })
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            orchestrator_url: "http://localhost:8080".to_string(),
            computing_power: 4,
            backoff_ms: 1000,
            timings: OperationTimings::default(),
        }
    }
}

/// Simulated latency per operation kind, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTimings {
    pub addition_ms: u64,
    pub subtraction_ms: u64,
    pub multiplication_ms: u64,
    pub division_ms: u64,
}

impl OperationTimings {
    /// Zero latency for every operation.
    pub fn instant() -> Self {
        Self { addition_ms: 0, subtraction_ms: 0, multiplication_ms: 0, division_ms: 0 }
    }

    pub fn delay_for(&self, op: Operation) -> Duration {
        let ms = match op {
            Operation::Add => self.addition_ms,
            Operation::Sub => self.subtraction_ms,
            Operation::Mul => self.multiplication_ms,
            Operation::Div => self.division_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for OperationTimings {
    fn default() -> Self {
        Self { addition_ms: 1000, subtraction_ms: 1000, multiplication_ms: 1000, division_ms: 1000 }
    }
}
