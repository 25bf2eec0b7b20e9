use rmcp::{model::*, ServiceExt};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::SearchError;
use crate::{mcp, AppState};

#[derive(Clone)]
pub struct McpService {
    pub state: Arc<AppState>,
}

impl McpService {
    pub fn new() -> anyhow::Result<Self> {
        // stdout carries the protocol, so logs go to stderr
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let config = Config::from_env()?;
        info!("Starting MCP Service");
        info!("SerpAPI URL: {}", config.base_url);

        Ok(Self::with_state(Arc::new(AppState::from_config(&config)?)))
    }

    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn search_tool() -> Tool {
        Tool::new(
            mcp::SEARCH_TOOL_NAME,
            mcp::SEARCH_TOOL_DESCRIPTION,
            Arc::new(mcp::search_tool_schema()),
        )
    }
}

impl rmcp::ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Internet search through SerpAPI using the Google or Bing engine. Results are cached for a few minutes.".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: vec![Self::search_tool()],
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("MCP tool call: {}", request.name);

        if request.name != mcp::SEARCH_TOOL_NAME {
            return Err(ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", request.name),
                None,
            ));
        }

        let args = request
            .arguments
            .map(serde_json::Value::Object)
            .ok_or_else(|| {
                ErrorData::new(
                    ErrorCode::INVALID_PARAMS,
                    "Missing required arguments object",
                    None,
                )
            })?;

        match mcp::invoke_search_tool(&self.state, &args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e @ (SearchError::InvalidArguments(_) | SearchError::UnsupportedEngine(_))) => {
                Err(ErrorData::new(ErrorCode::INVALID_PARAMS, e.to_string(), None))
            }
            Err(e) => {
                error!("Search tool error: {}", e);
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "Search failed: {}",
                    e
                ))]))
            }
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let service = McpService::new()?;
    let server = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server running");
    let _quit_reason = server.waiting().await?;
    Ok(())
}
