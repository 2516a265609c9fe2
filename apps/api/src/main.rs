mod analysis;
mod artifacts;
mod config;
mod errors;
mod llm_client;
mod routes;
mod search;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionProvider, LlmClient, Provider};
use crate::routes::build_router;
use crate::search::{SearchClient, WebSearch};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TechScope API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(&config)?;
    for provider in Provider::ALL {
        if llm.is_configured(provider) {
            info!("{provider} enabled (model: {})", provider.model());
        } else {
            warn!(
                "{provider} disabled: {} is not set; requests routed to it will fail",
                provider.api_key_env()
            );
        }
    }

    let search = SearchClient::new(&config)?;
    if search.is_configured() {
        info!("Web search backend: {}", search.backend());
    } else {
        info!(
            "Web search disabled ({} not set)",
            config.search_backend.api_key_env()
        );
    }

    let state = AppState {
        llm: Arc::new(llm),
        search: Arc::new(search),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
