use anyhow::{anyhow, ensure, Context, Result};

use crate::search::SearchBackend;

/// Application configuration loaded from environment variables.
///
/// Vendor and search keys are optional at startup: a missing key only fails
/// the requests that need it, with a `ConfigurationError` naming the variable.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
    pub search_backend: SearchBackend,
    pub bing_search_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub brave_search_api_key: Option<String>,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            claude_api_key: optional_env("CLAUDE_API_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL"),
            openai_base_url: optional_env("OPENAI_BASE_URL"),
            gemini_base_url: optional_env("GEMINI_BASE_URL"),
            search_backend: parse_search_backend(optional_env("SEARCH_PROVIDER"))?,
            bing_search_api_key: optional_env("BING_SEARCH_API_KEY"),
            serpapi_api_key: optional_env("SERPAPI_API_KEY"),
            brave_search_api_key: optional_env("BRAVE_SEARCH_API_KEY"),
            llm_timeout_secs: parse_timeout_secs(optional_env("LLM_TIMEOUT_SECS"))?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The key for the active search backend, if one is set.
    pub fn search_api_key(&self) -> Option<String> {
        match self.search_backend {
            SearchBackend::Bing => self.bing_search_api_key.clone(),
            SearchBackend::SerpApi => self.serpapi_api_key.clone(),
            SearchBackend::Brave => self.brave_search_api_key.clone(),
        }
    }
}

const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

fn parse_search_backend(raw: Option<String>) -> Result<SearchBackend> {
    match raw {
        Some(raw) => raw
            .parse::<SearchBackend>()
            .map_err(|e| anyhow!("SEARCH_PROVIDER '{raw}' is not supported: {e}")),
        None => Ok(SearchBackend::default()),
    }
}

fn parse_timeout_secs(raw: Option<String>) -> Result<u64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LLM_TIMEOUT_SECS);
    };
    let secs = raw
        .parse::<u64>()
        .with_context(|| format!("LLM_TIMEOUT_SECS '{raw}' must be a whole number of seconds"))?;
    ensure!(secs > 0, "LLM_TIMEOUT_SECS must be at least 1 second");
    Ok(secs)
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_api_key_follows_backend() {
        let config = Config {
            search_backend: SearchBackend::Brave,
            brave_search_api_key: Some("brave-key".to_string()),
            bing_search_api_key: Some("bing-key".to_string()),
            ..Config::default()
        };
        assert_eq!(config.search_api_key().as_deref(), Some("brave-key"));
    }

    #[test]
    fn test_search_provider_parsing() {
        assert_eq!(parse_search_backend(None).unwrap(), SearchBackend::default());
        assert_eq!(
            parse_search_backend(Some("brave".to_string())).unwrap(),
            SearchBackend::Brave
        );
        let err = parse_search_backend(Some("altavista".to_string())).unwrap_err();
        assert!(err.to_string().contains("SEARCH_PROVIDER 'altavista' is not supported"));
    }

    #[test]
    fn test_timeout_defaults_and_rejects_zero() {
        assert_eq!(parse_timeout_secs(None).unwrap(), 60);
        assert_eq!(parse_timeout_secs(Some("15".to_string())).unwrap(), 15);
        let err = parse_timeout_secs(Some("0".to_string())).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
        assert!(parse_timeout_secs(Some("soon".to_string())).is_err());
    }

    #[test]
    fn test_search_api_key_none_when_backend_key_missing() {
        let config = Config {
            search_backend: SearchBackend::SerpApi,
            bing_search_api_key: Some("bing-key".to_string()),
            ..Config::default()
        };
        assert!(config.search_api_key().is_none());
    }
}
