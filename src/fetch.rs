//! Search-provider collectors. These return flat hit lists; the CLI stamps
//! timestamps and wraps them into raw records, so the pipeline core never
//! touches HTTP or the clock.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// One provider hit before the caller stamps it into a `RawRecord`.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub rank: u32,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub raw_metadata: Map<String, Value>,
}

/// Brave is opt-in: without an API key the engine is skipped, not failed.
#[derive(Debug, thiserror::Error)]
#[error("brave collector disabled: BRAVE_API_KEY not set")]
pub struct BraveDisabled;

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: BraveWeb,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    age: Option<String>,
}

/// Queries a SearXNG instance's JSON API. Ranks are assigned 1-based by
/// result position.
pub async fn fetch_searxng(
    client: &Client,
    query: &str,
    base_url: &str,
    user_agent: &str,
    max_retries: u32,
) -> Result<Vec<SearchHit>> {
    let url = format!("{}/search", base_url.trim_end_matches('/'));
    let start = std::time::Instant::now();
    debug!("Fetching searxng results - query={:?}", query);

    let resp = get_with_retries(
        client,
        &url,
        &[("q", query), ("format", "json")],
        &[("User-Agent", user_agent)],
        max_retries,
    )
    .await?;
    let payload: SearxResponse = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {url}"))?;

    let hits: Vec<SearchHit> = payload
        .results
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut raw_metadata = Map::new();
            raw_metadata.insert(
                "score".to_string(),
                item.score.map(Value::from).unwrap_or(Value::Null),
            );
            SearchHit {
                rank: idx as u32 + 1,
                url: item.url,
                title: item.title,
                snippet: item.content,
                raw_metadata,
            }
        })
        .collect();

    info!(
        "SearXNG fetch completed - query={:?}, duration={:.2}s, results={}",
        query,
        start.elapsed().as_secs_f32(),
        hits.len()
    );
    Ok(hits)
}

/// Queries the Brave web search API. Returns [`BraveDisabled`] when
/// `BRAVE_API_KEY` is unset so the caller can skip the engine quietly.
pub async fn fetch_brave(
    client: &Client,
    query: &str,
    user_agent: &str,
    max_retries: u32,
) -> Result<Vec<SearchHit>> {
    let api_key = std::env::var("BRAVE_API_KEY").map_err(|_| BraveDisabled)?;
    let url = "https://api.search.brave.com/res/v1/web/search";
    let start = std::time::Instant::now();
    debug!("Fetching brave results - query={:?}", query);

    let resp = get_with_retries(
        client,
        url,
        &[("q", query)],
        &[
            ("Accept", "application/json"),
            ("User-Agent", user_agent),
            ("X-Subscription-Token", api_key.as_str()),
        ],
        max_retries,
    )
    .await?;
    let payload: BraveResponse = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {url}"))?;

    let hits: Vec<SearchHit> = payload
        .web
        .results
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let mut raw_metadata = Map::new();
            raw_metadata.insert(
                "age".to_string(),
                item.age.map(Value::from).unwrap_or(Value::Null),
            );
            SearchHit {
                rank: idx as u32 + 1,
                url: item.url,
                title: item.title,
                snippet: item.description,
                raw_metadata,
            }
        })
        .collect();

    info!(
        "Brave fetch completed - query={:?}, duration={:.2}s, results={}",
        query,
        start.elapsed().as_secs_f32(),
        hits.len()
    );
    Ok(hits)
}

/// Retries transport failures up to `max_retries` attempts; HTTP status
/// errors are returned immediately.
async fn get_with_retries(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
    headers: &[(&str, &str)],
    max_retries: u32,
) -> Result<reqwest::Response> {
    let attempts = max_retries.max(1);
    let mut last_err = None;
    for attempt in 1..=attempts {
        let mut request = client.get(url).query(params);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        match request.send().await {
            Ok(resp) => {
                return resp
                    .error_for_status()
                    .with_context(|| format!("HTTP error for {url}"));
            }
            Err(err) => {
                warn!(
                    "Request attempt failed - url={}, attempt={}/{}, error={}",
                    url, attempt, attempts, err
                );
                last_err = Some(err);
            }
        }
    }
    match last_err {
        Some(err) => Err(err).with_context(|| format!("Request failed for {url}")),
        None => anyhow::bail!("Request failed for {url}: no attempts made"),
    }
}
