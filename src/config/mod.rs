//! Runtime configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults (`127.0.0.1:5001`)
//! 2. TOML file from `--config` or `QUERYTAG_CONFIG`
//! 3. Environment: `PORT`, `QUERYTAG_PORT`, `QUERYTAG_HOST`
//! 4. CLI flags (applied by the binary)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
/// Maximum request body size (64KB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 65_536;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Env var naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "QUERYTAG_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
}

/// `[gateway]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Allow binding a non-loopback address.
    pub allow_public_bind: bool,
    pub max_body_bytes: usize,
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allow_public_bind: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Parse TOML, warning about (and ignoring) unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let table: toml::Table = raw.parse().context("config is not valid TOML")?;

        let mut unknown = Vec::new();
        let config: Self = serde_ignored::deserialize(toml::Value::Table(table), |path| {
            unknown.push(path.to_string());
        })
        .context("config contains invalid values")?;

        for key in &unknown {
            tracing::warn!("Ignoring unknown config key: {key}");
        }
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Defaults, then the config file (explicit path or `QUERYTAG_CONFIG`),
    /// then process environment overrides.
    pub fn resolve(explicit_path: Option<&Path>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_PATH_ENV).filter(|p| !p.is_empty()).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from {}", path.display());
                Self::load(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(env)?;
        Ok(config)
    }

    /// Apply `PORT`, `QUERYTAG_PORT` and `QUERYTAG_HOST` through `lookup`.
    /// `QUERYTAG_PORT` takes precedence over the generic `PORT`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["PORT", "QUERYTAG_PORT"] {
            if let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) {
                self.gateway.port = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key}={raw} is not a valid port"))?;
            }
        }
        if let Some(host) = lookup("QUERYTAG_HOST").filter(|v| !v.trim().is_empty()) {
            self.gateway.host = host.trim().to_string();
        }
        Ok(())
    }

    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        let gateway = &self.gateway;
        if gateway.host.trim().is_empty() {
            anyhow::bail!("gateway.host must not be empty");
        }
        if gateway.max_body_bytes == 0 {
            anyhow::bail!("gateway.max_body_bytes must be greater than zero");
        }
        if gateway.request_timeout_secs == 0 {
            anyhow::bail!("gateway.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
