//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! `ROUND_DURATION` and `REVEAL_DELAY` from the environment take
//! precedence over the file. Values are fixed at process start.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

use crate::types::GameError;

/// Environment variable overriding `round.duration_secs`.
pub const ROUND_DURATION_ENV: &str = "ROUND_DURATION";
/// Environment variable overriding `round.reveal_delay_secs`.
pub const REVEAL_DELAY_ENV: &str = "REVEAL_DELAY";

/// Upper bound for either phase length (one day).
const MAX_PHASE_SECS: u64 = 86_400;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub round: RoundConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RoundConfig {
    /// Length of the betting window.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// Pause between closing and settlement.
    #[serde(default = "default_reveal_delay_secs")]
    pub reveal_delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_duration_secs() -> u64 {
    30
}

fn default_reveal_delay_secs() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            reveal_delay_secs: default_reveal_delay_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl RoundConfig {
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.duration_secs as i64)
    }

    pub fn reveal_delay(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reveal_delay_secs as i64)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.duration_secs == 0 {
            return Err(GameError::Config("round duration must be positive".into()));
        }
        if self.duration_secs > MAX_PHASE_SECS {
            return Err(GameError::Config(format!(
                "round duration {}s exceeds {MAX_PHASE_SECS}s",
                self.duration_secs
            )));
        }
        if self.reveal_delay_secs > MAX_PHASE_SECS {
            return Err(GameError::Config(format!(
                "reveal delay {}s exceeds {MAX_PHASE_SECS}s",
                self.reveal_delay_secs
            )));
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address: {}:{}", self.host, self.port))
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply process environment
    /// overrides. A missing file falls back to defaults.
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`], resolving overrides through `lookup`
    /// instead of the process environment.
    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if Path::new(path).exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path}"))?;
            Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse config file: {path}"))?
        } else {
            info!(path, "No config file found, using defaults");
            Self::default()
        };

        config.apply_overrides(lookup)?;
        config.round.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without touching the environment.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `ROUND_DURATION` / `REVEAL_DELAY` overrides using `lookup`
    /// to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GameError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ROUND_DURATION_ENV) {
            self.round.duration_secs = parse_secs(ROUND_DURATION_ENV, &raw)?;
        }
        if let Some(raw) = lookup(REVEAL_DELAY_ENV) {
            self.round.reveal_delay_secs = parse_secs(REVEAL_DELAY_ENV, &raw)?;
        }
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, GameError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| GameError::Config(format!("{key}={raw:?} is not a whole number of seconds: {e}")))
}
