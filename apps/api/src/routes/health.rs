use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::Provider;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "techscope-api"
    }))
}

/// GET /api/status
///
/// Which providers and which search backend have keys. Never returns the keys.
pub async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    let providers: Vec<Value> = Provider::ALL
        .iter()
        .map(|&p| {
            json!({
                "provider": p,
                "name": p.display_name(),
                "model": p.model(),
                "configured": state.llm.is_configured(p),
                "envVar": p.api_key_env(),
            })
        })
        .collect();
    let backend = state.search.backend();

    Json(json!({
        "success": true,
        "data": {
            "providers": providers,
            "search": {
                "backend": backend,
                "name": backend.display_name(),
                "configured": state.search.is_configured(),
                "envVar": backend.api_key_env(),
            },
            "llmTimeoutSecs": state.config.llm_timeout_secs,
        }
    }))
}
