use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while dispatching a search or validating tool arguments.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unsupported search engine: {0}")]
    UnsupportedEngine(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status code: {code}")]
    UpstreamStatus { code: u16 },

    #[error("failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("received HTML instead of JSON: possible invalid API key or rate limit exceeded")]
    UnexpectedHtml,

    #[error("failed to parse JSON: {source}, raw response: {raw}")]
    MalformedJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response shape: {0}")]
    MalformedResponseShape(String),
}

impl SearchError {
    /// HTTP status the service answers with when this error reaches a handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::UnsupportedEngine(_) | SearchError::InvalidArguments(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
