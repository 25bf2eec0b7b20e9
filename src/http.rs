use crate::error::SearchError;
use crate::types::*;
use crate::{mcp, search, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::error;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/search", post(search_handler))
        .route("/mcp/tools", get(mcp::list_tools))
        .route("/mcp/call", post(mcp::call_tool))
        .with_state(state)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchHttpRequest>,
) -> Result<Json<SearchHttpResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (query, engine) = mcp::resolve_search_input(request.query, request.engine.as_deref())
        .map_err(into_response_error)?;
    let search_request = SearchRequest::new(query, engine, state.api_key.clone());

    match search::perform_search(&state, &search_request).await {
        Ok(result) => Ok(Json(SearchHttpResponse {
            query: search_request.query,
            engine,
            result,
        })),
        Err(e) => {
            error!("Search error: {}", e);
            Err(into_response_error(e))
        }
    }
}

fn into_response_error(e: SearchError) -> (StatusCode, Json<ErrorResponse>) {
    (
        e.status_code(),
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use std::time::Duration;

    fn state_for(server: &ServerGuard) -> Arc<AppState> {
        Arc::new(AppState::new(
            format!("{}/search", server.url()),
            "http-key".to_string(),
            reqwest::Client::builder().no_proxy().build().unwrap(),
            Duration::from_secs(300),
        ))
    }

    fn request(query: &str, engine: Option<&str>) -> Json<SearchHttpRequest> {
        Json(SearchHttpRequest {
            query: query.to_string(),
            engine: engine.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "serpapi-search");
    }

    #[tokio::test]
    async fn test_search_handler_returns_formatted_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "rust".into()),
                Matcher::UrlEncoded("engine".into(), "bing".into()),
                Matcher::UrlEncoded("api_key".into(), "http-key".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"organic_results": [{"title": "T", "link": "L", "snippet": "S"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let Json(resp) = search_handler(State(state_for(&server)), request("rust", Some("bing")))
            .await
            .unwrap();
        assert_eq!(resp.query, "rust");
        assert_eq!(resp.engine, Engine::Bing);
        assert_eq!(resp.result, "[1] T\nL\nS\n\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_handler_rejects_bad_input_without_upstream_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let state = state_for(&server);

        let (status, Json(body)) = search_handler(State(state.clone()), request("", None))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("query"));

        let (status, _) = search_handler(State(state.clone()), request("rust", Some("yahoo")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(state.search_cache.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_handler_maps_upstream_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        let (status, Json(body)) = search_handler(State(state_for(&server)), request("rust", None))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "unexpected status code: 429");
    }
}
