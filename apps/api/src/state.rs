use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::search::WebSearch;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Nothing in here is mutable: requests are independent and share only the
/// HTTP clients.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, a canned stub in tests.
    pub llm: Arc<dyn CompletionProvider>,
    pub search: Arc<dyn WebSearch>,
    pub config: Config,
}
