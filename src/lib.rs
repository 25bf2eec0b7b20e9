pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod search;
pub mod stdio_service;
pub mod types;

use std::time::Duration;

pub struct AppState {
    pub base_url: String,
    pub api_key: String,
    pub http_client: reqwest::Client,
    // Formatted results keyed by (query, engine)
    pub search_cache: cache::SearchCache,
}

pub use error::SearchError;
pub use types::*;

impl AppState {
    pub fn new(
        base_url: String,
        api_key: String,
        http_client: reqwest::Client,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            base_url,
            api_key,
            http_client,
            search_cache: cache::SearchCache::new(cache_ttl),
        }
    }

    pub fn from_config(config: &config::Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.http_client()?,
            config.cache_ttl,
        ))
    }
}
