pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::artifacts::handlers::handle_artifacts;
use crate::search::handlers::handle_search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/status", get(health::status_handler))
        // Analysis modules
        .route("/api/market-analysis", post(handlers::handle_market_analysis))
        .route("/api/vendor-analysis", post(handlers::handle_vendor_analysis))
        .route(
            "/api/maturity-analysis",
            post(handlers::handle_maturity_analysis),
        )
        .route(
            "/api/forecast-analysis",
            post(handlers::handle_forecast_analysis),
        )
        .route(
            "/api/quadrant-analysis",
            post(handlers::handle_quadrant_analysis),
        )
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/analyze/:kind", post(handlers::handle_analyze_kind))
        .route(
            "/api/comprehensive-analysis",
            post(handlers::handle_comprehensive_analysis),
        )
        .route("/api/completion", post(handlers::handle_completion))
        // Supporting endpoints
        .route("/api/search", post(handle_search))
        .route("/api/artifacts", post(handle_artifacts))
        .with_state(state)
}
