//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main manager configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ManagerConfig {
    pub api_port: u16,

    /// Load the demo models and schemes at startup
    pub seed_mock_data: bool,

    /// Upper bound on stored models; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_models: Option<usize>,

    /// Artificial delay applied before every write
    pub simulated_latency_ms: u64,

    /// Priority used when an associate request omits one
    pub default_priority: i64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            seed_mock_data: true,
            max_models: None,
            simulated_latency_ms: 0,
            default_priority: default_priority(),
        }
    }
}

impl ManagerConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(port) = std::env::var("MODEL_MANAGER_API_PORT") {
            config.api_port = port
                .parse()
                .context("Invalid MODEL_MANAGER_API_PORT value")?;
        }
        if let Ok(seed) = std::env::var("MODEL_MANAGER_SEED") {
            config.seed_mock_data = seed.parse().context("Invalid MODEL_MANAGER_SEED value")?;
        }
        if let Ok(max) = std::env::var("MODEL_MANAGER_MAX_MODELS") {
            config.max_models = Some(
                max.parse()
                    .context("Invalid MODEL_MANAGER_MAX_MODELS value")?,
            );
        }
        if let Ok(latency) = std::env::var("MODEL_MANAGER_SIMULATED_LATENCY_MS") {
            config.simulated_latency_ms = latency
                .parse()
                .context("Invalid MODEL_MANAGER_SIMULATED_LATENCY_MS value")?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_port < 1024 {
            anyhow::bail!("API port must be >= 1024 (got {})", self.api_port);
        }

        if !(1..=10).contains(&self.default_priority) {
            anyhow::bail!(
                "default_priority must be between 1 and 10 (got {})",
                self.default_priority
            );
        }

        if self.max_models == Some(0) {
            anyhow::bail!("max_models must be greater than 0 when set");
        }

        Ok(())
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

fn default_api_port() -> u16 {
    9000
}
fn default_priority() -> i64 {
    5
}
