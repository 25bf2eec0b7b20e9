use crate::error::SearchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream backend selected through SerpAPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Google,
    Bing,
}

impl Engine {
    /// Value sent as the `engine` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Google => "google",
            Engine::Bing => "bing",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Engine::Google),
            "bing" => Ok(Engine::Bing),
            other => Err(SearchError::UnsupportedEngine(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub engine: Engine,
    pub api_key: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, engine: Engine, api_key: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            engine,
            api_key: api_key.into(),
        }
    }

    /// Builds a request from an untyped engine name, rejecting anything but google/bing.
    pub fn parse(
        query: impl Into<String>,
        engine: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, SearchError> {
        Ok(Self::new(query, engine.parse()?, api_key))
    }
}

/// Arguments accepted by the `search_internet` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchToolArgs {
    /// The search query text
    pub query: String,
    /// The search engine to use (google or bing)
    #[serde(default)]
    pub engine: Option<String>,
}

// HTTP service types
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHttpRequest {
    pub query: String,
    #[serde(default)]
    pub engine: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHttpResponse {
    pub query: String,
    pub engine: Engine,
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// SerpAPI response types
#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}
