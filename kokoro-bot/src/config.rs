//! Runtime configuration.
//!
//! Everything comes from the process environment. `GEMINI_API_KEY` is the
//! only required setting; the rest default to sensible local-development
//! values.

use crate::error::{ConfigError, ConfigResult};
use std::str::FromStr;
use std::time::Duration;

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// HTTP surface settings.
    pub server: ServerConfig,
    /// Generator provider settings.
    pub generator: GeneratorConfig,
    /// Session store tuning.
    pub session: SessionTuning,
}

/// HTTP surface settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:8080".to_string()],
        }
    }
}

/// Generator provider settings.
#[derive(Clone)]
pub struct GeneratorConfig {
    /// API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Session store tuning.
#[derive(Debug, Clone, Copy)]
pub struct SessionTuning {
    /// Maximum messages retained per session.
    pub max_history: usize,
    /// Idle lifetime after which a session is reaped. `None` disables the
    /// sweeper entirely.
    pub idle_ttl: Option<Duration>,
    /// Interval between sweeps when a TTL is set.
    pub sweep_interval: Duration,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            max_history: 50,
            idle_ttl: None,
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl BotConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// `Missing` when `GEMINI_API_KEY` is unset; `Invalid` when a numeric
    /// setting fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("GEMINI_API_KEY"))?;

        let generator = GeneratorConfig {
            api_key,
            model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
        };

        let server = ServerConfig {
            host: env_or("KOKORO_HOST", "127.0.0.1"),
            port: parse_env("KOKORO_PORT")?.unwrap_or(8000),
            allowed_origins: split_origins(&env_or("ALLOWED_ORIGINS", "http://localhost:8080")),
        };

        let session = SessionTuning {
            max_history: parse_env("MAX_HISTORY")?.unwrap_or(50),
            idle_ttl: parse_env::<u64>("SESSION_IDLE_TTL_SECS")?.map(Duration::from_secs),
            sweep_interval: Duration::from_secs(parse_env("SWEEP_INTERVAL_SECS")?.unwrap_or(60)),
        };

        Ok(Self {
            server,
            generator,
            session,
        })
    }
}

/// Split a comma-separated origins string, dropping empty entries.
#[must_use]
pub fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: FromStr>(name: &str) -> ConfigResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> ConfigResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(format!("{name}: `{raw}` is not a valid value")))
}
