//! Web search context: one GET to the configured search backend.
//!
//! Used by `/api/search` directly and, when a caller asks for it, to append a
//! few recent results to an analysis prompt. Like the LLM client, a missing key
//! is a configuration error and there is a single attempt per call.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod handlers;

const BING_URL: &str = "https://api.bing.microsoft.com/v7.0/search";
const SERPAPI_URL: &str = "https://serpapi.com/search.json";
const BRAVE_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const SEARCH_TIMEOUT_SECS: u64 = 8;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    #[default]
    Bing,
    #[serde(rename = "serpapi")]
    SerpApi,
    Brave,
}

impl SearchBackend {
    pub fn display_name(self) -> &'static str {
        match self {
            SearchBackend::Bing => "Bing Search",
            SearchBackend::SerpApi => "SerpAPI",
            SearchBackend::Brave => "Brave Search",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            SearchBackend::Bing => "BING_SEARCH_API_KEY",
            SearchBackend::SerpApi => "SERPAPI_API_KEY",
            SearchBackend::Brave => "BRAVE_SEARCH_API_KEY",
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SearchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bing" => Ok(SearchBackend::Bing),
            "serpapi" | "serp" | "google" => Ok(SearchBackend::SerpApi),
            "brave" => Ok(SearchBackend::Brave),
            other => Err(format!("unknown search provider '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{backend} API key not configured")]
    NotConfigured { backend: SearchBackend },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} API error (status {status}): {message}")]
    Api {
        backend: SearchBackend,
        status: u16,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;

    fn backend(&self) -> SearchBackend;

    fn is_configured(&self) -> bool;
}

// ────────────────────────────────────────────────────────────────────────────
// Backend response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl BingResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.web_pages
            .map(|p| p.value)
            .unwrap_or_default()
            .into_iter()
            .map(|p| hit(p.name, p.url, p.snippet))
            .collect()
    }
}

impl SerpApiResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.organic_results
            .into_iter()
            .map(|r| hit(r.title, r.link, r.snippet))
            .collect()
    }
}

impl BraveResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        self.web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| hit(r.title, r.url, r.description))
            .collect()
    }
}

/// Builds a hit with HTML highlighting tags stripped.
fn hit(title: String, url: String, snippet: String) -> SearchHit {
    SearchHit {
        title: TAG_RE.replace_all(&title, "").trim().to_string(),
        url,
        snippet: TAG_RE.replace_all(&snippet, "").trim().to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    backend: SearchBackend,
    api_key: Option<String>,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()?,
            backend: config.search_backend,
            api_key: config.search_api_key(),
        })
    }
}

#[async_trait]
impl WebSearch for SearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::NotConfigured {
            backend: self.backend,
        })?;
        let count = limit.to_string();

        let request = match self.backend {
            SearchBackend::Bing => self
                .client
                .get(BING_URL)
                .header("Ocp-Apim-Subscription-Key", api_key)
                .query(&[("q", query), ("count", count.as_str())]),
            SearchBackend::SerpApi => self.client.get(SERPAPI_URL).query(&[
                ("engine", "google"),
                ("q", query),
                ("num", count.as_str()),
                ("api_key", api_key),
            ]),
            SearchBackend::Brave => self
                .client
                .get(BRAVE_URL)
                .header("X-Subscription-Token", api_key)
                .header("Accept", "application/json")
                .query(&[("q", query), ("count", count.as_str())]),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                backend: self.backend,
                status: status.as_u16(),
                message,
            });
        }

        let mut hits = match self.backend {
            SearchBackend::Bing => response.json::<BingResponse>().await?.into_hits(),
            SearchBackend::SerpApi => response.json::<SerpApiResponse>().await?.into_hits(),
            SearchBackend::Brave => response.json::<BraveResponse>().await?.into_hits(),
        };
        hits.truncate(limit);

        debug!("{} returned {} results for '{query}'", self.backend, hits.len());
        Ok(hits)
    }

    fn backend(&self) -> SearchBackend {
        self.backend
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Query sent for a technology.
pub fn technology_query(technology: &str) -> String {
    format!("{} market trends vendors adoption", technology.trim())
}

/// Renders hits as a bullet list for inclusion in a prompt.
pub fn format_for_prompt(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("- {}: {}", h.title, h.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parses_env_values() {
        assert_eq!("BING".parse::<SearchBackend>().unwrap(), SearchBackend::Bing);
        assert_eq!("serpapi".parse::<SearchBackend>().unwrap(), SearchBackend::SerpApi);
        assert_eq!("brave".parse::<SearchBackend>().unwrap(), SearchBackend::Brave);
        assert!("duckduckgo".parse::<SearchBackend>().is_err());
    }

    #[test]
    fn test_bing_response_maps_to_hits() {
        let json = r#"{"webPages": {"value": [
            {"name": "Zero Trust <b>Market</b>", "url": "https://a.example", "snippet": "Grew 17%"}
        ]}}"#;
        let hits = serde_json::from_str::<BingResponse>(json).unwrap().into_hits();
        assert_eq!(
            hits,
            vec![SearchHit {
                title: "Zero Trust Market".to_string(),
                url: "https://a.example".to_string(),
                snippet: "Grew 17%".to_string(),
            }]
        );
    }

    #[test]
    fn test_serpapi_response_without_results_is_empty() {
        let hits = serde_json::from_str::<SerpApiResponse>(r#"{"search_metadata": {}}"#)
            .unwrap()
            .into_hits();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_brave_snippet_tags_are_stripped() {
        let json = r#"{"web": {"results": [
            {"title": "SASE", "url": "https://b.example", "description": "<strong>SASE</strong> adoption doubles"}
        ]}}"#;
        let hits = serde_json::from_str::<BraveResponse>(json).unwrap().into_hits();
        assert_eq!(hits[0].snippet, "SASE adoption doubles");
    }

    #[tokio::test]
    async fn test_search_without_key_is_not_configured() {
        let client = SearchClient::new(&Config {
            search_backend: SearchBackend::Brave,
            ..Config::default()
        })
        .unwrap();
        assert!(!client.is_configured());
        let err = client.search("zero trust", 3).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::NotConfigured {
                backend: SearchBackend::Brave
            }
        ));
    }

    #[test]
    fn test_format_for_prompt() {
        let hits = vec![SearchHit {
            title: "T".to_string(),
            url: "u".to_string(),
            snippet: "S".to_string(),
        }];
        assert_eq!(format_for_prompt(&hits), "- T: S");
    }
}
