//! Client configuration, read from the environment.
//!
//! - `OPENAI_API_KEY` - Required. Bearer credential for every request.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `OPENAI_MODEL` - Optional. Defaults to `gpt-4o-mini`.
//! - `OPENAI_TIMEOUT_SECS` - Optional. Per-request timeout. Defaults to `60`.
//! - `OPENAI_MAX_RETRIES` - Optional. Retries for retryable failures. Defaults to `0`.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    /// Multiplied by the attempt number between retries.
    pub retry_backoff: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so callers can supply values
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let base_url = lookup("OPENAI_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let model = lookup("OPENAI_MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = parse_or("OPENAI_TIMEOUT_SECS", &lookup, DEFAULT_TIMEOUT_SECS)?;
        let max_retries = parse_or("OPENAI_MAX_RETRIES", &lookup, 0u32)?;

        Ok(Self {
            api_key,
            base_url,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            max_retries,
            retry_backoff: Duration::from_millis(500),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
        _ => Ok(default),
    }
}
