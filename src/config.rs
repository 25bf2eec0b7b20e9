use crate::cache::DEFAULT_TTL;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com/search";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Upper bound for both the cache TTL and the HTTP timeout.
pub const MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// Runtime settings, read once from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub bind_addr: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("cache_ttl", &self.cache_ttl)
            .field("http_timeout", &self.http_timeout)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("SERPAPI_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("SERPAPI_API_KEY must be set"))?;

        let base_url = lookup("SERPAPI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url).with_context(|| format!("Invalid SERPAPI_BASE_URL '{}'", base_url))?;

        let cache_ttl = match lookup("SERPAPI_CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(parse_secs("SERPAPI_CACHE_TTL_SECS", &v)?),
            None => DEFAULT_TTL,
        };
        let http_timeout = Duration::from_secs(match lookup("SERPAPI_HTTP_TIMEOUT_SECS") {
            Some(v) => parse_secs("SERPAPI_HTTP_TIMEOUT_SECS", &v)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        });
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            api_key,
            base_url,
            cache_ttl,
            http_timeout,
            bind_addr,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(self.http_timeout).build()?)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    let secs = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, value))?;
    if secs > MAX_DURATION_SECS {
        return Err(anyhow!(
            "{} must be at most {} seconds, got {}",
            name,
            MAX_DURATION_SECS,
            secs
        ));
    }
    Ok(secs)
}
