use crate::cache::CacheKey;
use crate::error::{Result, SearchError};
use crate::types::*;
use crate::AppState;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Returns the formatted results for `request`, serving from the cache while fresh.
///
/// Fetch errors propagate to the caller and are never cached.
pub async fn perform_search(state: &AppState, request: &SearchRequest) -> Result<String> {
    let key = CacheKey::new(request.query.clone(), request.engine);
    if let Some(cached) = state.search_cache.lookup(&key) {
        debug!(engine = %request.engine, "search cache hit for query");
        return Ok(cached);
    }

    info!("Searching {} for: {}", request.engine, request.query);
    let result = fetch_organic_results(
        &state.http_client,
        &state.base_url,
        request.engine,
        &request.query,
        &request.api_key,
    )
    .await
    .map_err(|e| {
        warn!("{} search failed: {}", request.engine, e);
        e
    })?;

    state.search_cache.store(key, result.clone());
    Ok(result)
}

/// Issues one GET against the SerpAPI endpoint and formats its organic results.
pub async fn fetch_organic_results(
    client: &Client,
    base_url: &str,
    engine: Engine,
    query: &str,
    api_key: &str,
) -> Result<String> {
    debug!("Search URL: {} (engine={})", base_url, engine);
    let resp = client
        .get(base_url)
        .query(&[("q", query), ("engine", engine.as_str()), ("api_key", api_key)])
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(SearchError::Transport)?;

    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(SearchError::BodyRead)?;

    // SerpAPI answers with an HTML page on bad keys and rate limits, whatever the status
    if body.first() == Some(&b'<') {
        return Err(SearchError::UnexpectedHtml);
    }
    if status != 200 {
        return Err(SearchError::UpstreamStatus { code: status });
    }

    let results = parse_organic_results(&body)?;
    debug!("SerpAPI returned {} organic results", results.len());
    Ok(format_results(&results))
}

/// Extracts `organic_results` from a SerpAPI JSON body.
pub fn parse_organic_results(body: &[u8]) -> Result<Vec<OrganicResult>> {
    let malformed = |source: serde_json::Error| SearchError::MalformedJson {
        raw: String::from_utf8_lossy(body).into_owned(),
        source,
    };
    let mut object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(body).map_err(malformed)?;

    let organic = object.remove("organic_results").ok_or_else(|| {
        let detail = object
            .get("error")
            .and_then(|e| e.as_str())
            .map(|e| format!(" (upstream error: {})", e))
            .unwrap_or_default();
        SearchError::MalformedResponseShape(format!("missing organic_results{}", detail))
    })?;

    serde_json::from_value(organic).map_err(|e| {
        SearchError::MalformedResponseShape(format!(
            "organic_results is not a list of result objects: {}",
            e
        ))
    })
}

/// Renders results as `[n] title`, link and snippet lines, each block followed by a blank line.
pub fn format_results(results: &[OrganicResult]) -> String {
    let mut output = String::new();
    for (i, item) in results.iter().enumerate() {
        output.push_str(&format!(
            "[{}] {}\n{}\n{}\n\n",
            i + 1,
            item.title.as_deref().unwrap_or_default(),
            item.link.as_deref().unwrap_or_default(),
            item.snippet.as_deref().unwrap_or_default(),
        ));
    }
    output
}
