use std::{env, path::PathBuf, time::Duration};
use anyhow::{Context, Result};

/// The API base URL used when `CRAFTMIND_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
/// The request timeout used when `CRAFTMIND_API_TIMEOUT_MS` is not set.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
/// The state directory used when `CRAFTMIND_STATE_DIR` is not set.
pub const DEFAULT_STATE_DIR: &str = ".craftmind";
/// Seconds a cached query stays fresh.
pub const DEFAULT_QUERY_STALE_SECS: u64 = 30;
/// Retries a failed query gets on transient errors.
pub const DEFAULT_QUERY_RETRIES: u32 = 1;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL of the REST backend, without a trailing slash.
    pub api_url: String,
    /// The bounded timeout applied to every request.
    pub timeout: Duration,
    /// The directory holding the persisted bearer token.
    pub state_dir: PathBuf,
    /// How long a cached query result is served without refetching.
    pub query_stale_time: Duration,
    /// How many times a query is retried after a transient failure.
    pub query_retries: u32,
}

impl Config {
    /// Creates a `Config` pointing at `api_url` with every other value defaulted.
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            query_stale_time: Duration::from_secs(DEFAULT_QUERY_STALE_SECS),
            query_retries: DEFAULT_QUERY_RETRIES,
        })
    }

    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = var("CRAFTMIND_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_ms: u64 = var("CRAFTMIND_API_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_MS.to_string())
            .trim()
            .parse()
            .context("Invalid CRAFTMIND_API_TIMEOUT_MS")?;
        if timeout_ms == 0 {
            anyhow::bail!("CRAFTMIND_API_TIMEOUT_MS must be greater than zero");
        }

        let stale_secs: u64 = var("CRAFTMIND_QUERY_STALE_SECS")
            .unwrap_or_else(|| DEFAULT_QUERY_STALE_SECS.to_string())
            .trim()
            .parse()
            .context("Invalid CRAFTMIND_QUERY_STALE_SECS")?;

        let query_retries: u32 = var("CRAFTMIND_QUERY_RETRIES")
            .unwrap_or_else(|| DEFAULT_QUERY_RETRIES.to_string())
            .trim()
            .parse()
            .context("Invalid CRAFTMIND_QUERY_RETRIES")?;

        Ok(Self {
            api_url: normalize_api_url(&api_url)
                .context("CRAFTMIND_API_URL must be an http(s) URL with a host")?,
            timeout: Duration::from_millis(timeout_ms),
            state_dir: PathBuf::from(
                var("CRAFTMIND_STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_string()),
            ),
            query_stale_time: Duration::from_secs(stale_secs),
            query_retries,
        })
    }
}

/// Trims the URL and drops trailing slashes, rejecting anything that is not http(s).
pub fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        anyhow::bail!("API URL must not be empty");
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        anyhow::bail!("API URL must include a scheme: {}", trimmed);
    };
    if scheme != "http" && scheme != "https" {
        anyhow::bail!("API URL must use http:// or https://: {}", trimmed);
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        anyhow::bail!("API URL must include a host: {}", trimmed);
    }
    Ok(trimmed.to_string())
}
