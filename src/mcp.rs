use crate::error::{Result, SearchError};
use crate::types::*;
use crate::{search, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub const SEARCH_TOOL_NAME: &str = "search_internet";
pub const SEARCH_TOOL_DESCRIPTION: &str =
    "Perform internet search using SerpAPI with Google or Bing engines.";

#[derive(Debug, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl McpCallResponse {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![McpContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error,
        }
    }
}

/// JSON schema of the `search_internet` arguments.
pub fn search_tool_schema() -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(schemars::schema_for!(SearchToolArgs)) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// Validates raw tool arguments: `query` is required, `engine` defaults to google.
pub fn parse_search_args(arguments: &serde_json::Value) -> Result<(String, Engine)> {
    if !arguments.is_object() {
        return Err(SearchError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        ));
    }
    let args: SearchToolArgs = serde_json::from_value(arguments.clone())
        .map_err(|e| SearchError::InvalidArguments(format!("failed to parse arguments: {}", e)))?;

    resolve_search_input(args.query, args.engine.as_deref())
}

/// Rejects an empty query and resolves the engine name, defaulting to google.
///
/// Shared by the tool boundary and the `/search` route.
pub fn resolve_search_input(query: String, engine: Option<&str>) -> Result<(String, Engine)> {
    if query.is_empty() {
        return Err(SearchError::InvalidArguments(
            "invalid or missing 'query' parameter".to_string(),
        ));
    }
    let engine = match engine {
        Some(name) => name.parse::<Engine>()?,
        None => Engine::default(),
    };
    Ok((query, engine))
}

/// Runs the `search_internet` tool with the configured API key.
pub async fn invoke_search_tool(state: &AppState, arguments: &serde_json::Value) -> Result<String> {
    let (query, engine) = parse_search_args(arguments)?;
    let request = SearchRequest::new(query, engine, state.api_key.clone());
    search::perform_search(state, &request).await
}

pub async fn list_tools() -> Json<McpToolsResponse> {
    Json(McpToolsResponse {
        tools: vec![McpTool {
            name: SEARCH_TOOL_NAME.to_string(),
            description: SEARCH_TOOL_DESCRIPTION.to_string(),
            input_schema: serde_json::Value::Object(search_tool_schema()),
        }],
    })
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpCallRequest>,
) -> std::result::Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("MCP tool call: {}", request.name);

    if request.name != SEARCH_TOOL_NAME {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown tool: {}", request.name),
            }),
        ));
    }

    match invoke_search_tool(&state, &request.arguments).await {
        Ok(text) => Ok(Json(McpCallResponse::text(text, false))),
        Err(e @ (SearchError::InvalidArguments(_) | SearchError::UnsupportedEngine(_))) => Err((
            e.status_code(),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => {
            error!("Search tool error: {}", e);
            Ok(Json(McpCallResponse::text(format!("Search failed: {}", e), true)))
        }
    }
}
