//! Canned backends for handler and pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::llm_client::{Completion, CompletionProvider, CompletionRequest, LlmError, Provider, Usage};
use crate::search::{SearchBackend, SearchError, SearchHit, WebSearch};
use crate::state::AppState;

/// Replies with fixed text, except for providers marked unconfigured or when
/// an upstream error is set.
#[derive(Default)]
pub struct StubLlm {
    reply: String,
    unconfigured: Vec<Provider>,
    upstream_error: Option<(u16, String)>,
    calls: Mutex<Vec<(Provider, CompletionRequest)>>,
}

impl StubLlm {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: text.to_string(),
            ..Self::default()
        })
    }

    pub fn without_keys() -> Arc<Self> {
        Arc::new(Self {
            unconfigured: Provider::ALL.to_vec(),
            ..Self::default()
        })
    }

    pub fn missing(text: &str, unconfigured: &[Provider]) -> Arc<Self> {
        Arc::new(Self {
            reply: text.to_string(),
            unconfigured: unconfigured.to_vec(),
            ..Self::default()
        })
    }

    pub fn upstream_error(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            upstream_error: Some((status, message.to_string())),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<(Provider, CompletionRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubLlm {
    async fn complete(
        &self,
        provider: Provider,
        request: &CompletionRequest,
    ) -> Result<Completion, LlmError> {
        if self.unconfigured.contains(&provider) {
            return Err(LlmError::NotConfigured { provider });
        }
        self.calls.lock().unwrap().push((provider, request.clone()));
        if let Some((status, message)) = &self.upstream_error {
            return Err(LlmError::Api {
                provider,
                status: *status,
                message: message.clone(),
            });
        }
        Ok(Completion {
            provider,
            model: provider.model().to_string(),
            raw_text: self.reply.clone(),
            usage: Usage {
                input_tokens: 120,
                output_tokens: 340,
            },
        })
    }

    fn is_configured(&self, provider: Provider) -> bool {
        !self.unconfigured.contains(&provider)
    }
}

#[derive(Default)]
pub struct StubSearch {
    hits: Vec<SearchHit>,
    configured: bool,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn empty() -> Arc<Self> {
        Self::with_hits(Vec::new())
    }

    pub fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
        Arc::new(Self {
            hits,
            configured: true,
            ..Self::default()
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            failing: true,
            ..Self::default()
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        if !self.configured {
            return Err(SearchError::NotConfigured {
                backend: SearchBackend::Bing,
            });
        }
        if self.failing {
            return Err(SearchError::Api {
                backend: SearchBackend::Bing,
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::Bing
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

pub fn state_with(llm: Arc<StubLlm>, search: Arc<StubSearch>) -> AppState {
    AppState {
        llm,
        search,
        config: Config::default(),
    }
}

/// What the mock vendor saw on its most recent request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A local HTTP server standing in for a vendor API. Every request gets the
/// same status and JSON body; point a `*_base_url` at `base_url`.
pub struct MockVendor {
    pub base_url: String,
    last: Arc<Mutex<Option<RecordedRequest>>>,
}

impl MockVendor {
    pub async fn start(status: StatusCode, reply: &str) -> Self {
        let last = Arc::new(Mutex::new(None));
        let seen = last.clone();
        let reply = reply.to_string();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: String| {
            let seen = seen.clone();
            let reply = reply.clone();
            async move {
                *seen.lock().unwrap() = Some(RecordedRequest {
                    path: uri.path().to_string(),
                    headers,
                    body: serde_json::from_str(&body).unwrap_or(Value::Null),
                });
                (status, [(header::CONTENT_TYPE, "application/json")], reply)
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self {
            base_url: format!("http://{addr}"),
            last,
        }
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.last
            .lock()
            .unwrap()
            .clone()
            .expect("no request reached the mock vendor")
    }
}
