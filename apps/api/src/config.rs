use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::outreach::acquisition::{default_seniorities, AcquisitionConfig};
use crate::outreach::people_search::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub apollo_api_key: String,
    pub apollo_base_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Per-HTTP-call timeout for the people-search provider.
    pub http_timeout: Duration,
    /// Caller-level timeout wrapping one whole acquisition run.
    pub acquisition_timeout: Duration,
    pub acquisition: AcquisitionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let acquisition = AcquisitionConfig {
            max_pages: parse_env("ACQUISITION_MAX_PAGES", 1)?,
            per_page: parse_env("ACQUISITION_PER_PAGE", 25)?,
            seniorities: std::env::var("ACQUISITION_SENIORITIES")
                .ok()
                .map(|raw| parse_list(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(default_seniorities),
            ..AcquisitionConfig::default()
        };

        Ok(Config {
            apollo_api_key: require_env("APOLLO_API_KEY")?,
            apollo_base_url: std::env::var("APOLLO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 30)?),
            acquisition_timeout: Duration::from_secs(parse_env("ACQUISITION_TIMEOUT_SECS", 180)?),
            acquisition,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
