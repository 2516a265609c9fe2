//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::analysis::kinds::AnalysisKind;
use crate::analysis::orchestrator::{run_comprehensive, ComprehensiveData};
use crate::analysis::pipeline::{run_analysis, AnalysisData, AnalysisRequest, ApiResponse, Stopwatch};
use crate::errors::AppError;
use crate::llm_client::{Completion, CompletionRequest, Provider};
use crate::state::AppState;

const DEFAULT_COMPLETION_TOKENS: u32 = 1000;
const MAX_COMPLETION_TOKENS: u32 = 4096;
const DEFAULT_COMPLETION_TEMPERATURE: f32 = 0.7;

type AnalysisPayload = Result<Json<AnalysisRequest>, JsonRejection>;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBody {
    pub prompt: Option<String>,
    pub system: Option<String>,
    pub provider: Option<Provider>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionBody {
    fn into_request(self) -> Result<(Provider, CompletionRequest), AppError> {
        let prompt = self.prompt.unwrap_or_default();
        if prompt.trim().is_empty() {
            return Err(AppError::Validation("prompt is required".to_string()));
        }

        let max_tokens = self.max_tokens.unwrap_or(DEFAULT_COMPLETION_TOKENS);
        if max_tokens == 0 || max_tokens > MAX_COMPLETION_TOKENS {
            return Err(AppError::Validation(format!(
                "maxTokens must be between 1 and {MAX_COMPLETION_TOKENS}"
            )));
        }

        let temperature = self.temperature.unwrap_or(DEFAULT_COMPLETION_TEMPERATURE);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(AppError::Validation(
                "temperature must be between 0 and 1".to_string(),
            ));
        }

        Ok((
            self.provider.unwrap_or(Provider::Claude),
            CompletionRequest {
                prompt,
                system: self.system.filter(|s| !s.trim().is_empty()),
                max_tokens,
                temperature,
            },
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn analyze(
    state: &AppState,
    kind: AnalysisKind,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    let Json(request) = payload?;
    let watch = Stopwatch::start();
    let data = run_analysis(state, kind, &request).await?;
    Ok(Json(ApiResponse::ok(data, &watch)))
}

/// POST /api/market-analysis
pub async fn handle_market_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    analyze(&state, AnalysisKind::Market, payload).await
}

/// POST /api/vendor-analysis
///
/// Accepts an optional `vendor` to put one company at the center of the brief.
pub async fn handle_vendor_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    analyze(&state, AnalysisKind::Vendor, payload).await
}

/// POST /api/maturity-analysis
pub async fn handle_maturity_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    analyze(&state, AnalysisKind::Maturity, payload).await
}

/// POST /api/forecast-analysis
pub async fn handle_forecast_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    analyze(&state, AnalysisKind::Forecast, payload).await
}

/// POST /api/quadrant-analysis
pub async fn handle_quadrant_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    analyze(&state, AnalysisKind::Quadrant, payload).await
}

/// POST /api/analyze/:kind
pub async fn handle_analyze_kind(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    let kind = kind
        .parse::<AnalysisKind>()
        .map_err(|_| AppError::NotFound(format!("unknown analysis kind '{kind}'")))?;
    analyze(&state, kind, payload).await
}

/// POST /api/analyze
///
/// Single entry point; the body names the analysis in `endpoint`, e.g.
/// `"market-analysis"` or `"/api/market-analysis"`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<AnalysisData>>, AppError> {
    let Json(request) = payload?;
    let endpoint = request.endpoint.as_deref().map(str::trim).unwrap_or_default();
    if endpoint.is_empty() {
        return Err(AppError::Validation("endpoint is required".to_string()));
    }
    let kind = endpoint
        .parse::<AnalysisKind>()
        .map_err(|_| AppError::Validation(format!("unknown analysis endpoint '{endpoint}'")))?;
    analyze(&state, kind, Ok(Json(request))).await
}

/// POST /api/comprehensive-analysis
pub async fn handle_comprehensive_analysis(
    State(state): State<AppState>,
    payload: AnalysisPayload,
) -> Result<Json<ApiResponse<ComprehensiveData>>, AppError> {
    let Json(request) = payload?;
    let watch = Stopwatch::start();
    let data = run_comprehensive(&state, &request).await?;
    Ok(Json(ApiResponse::ok(data, &watch)))
}

/// POST /api/completion
///
/// Raw pass-through completion: no analyst framing, no extraction.
pub async fn handle_completion(
    State(state): State<AppState>,
    payload: Result<Json<CompletionBody>, JsonRejection>,
) -> Result<Json<ApiResponse<Completion>>, AppError> {
    let Json(body) = payload?;
    let (provider, request) = body.into_request()?;

    info!("Raw completion via {provider} ({} prompt chars)", request.prompt.len());
    let watch = Stopwatch::start();
    let completion = state.llm.complete(provider, &request).await?;
    Ok(Json(ApiResponse::ok(completion, &watch)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_defaults() {
        let (provider, request) = CompletionBody {
            prompt: Some("Summarize SASE".to_string()),
            ..CompletionBody::default()
        }
        .into_request()
        .unwrap();
        assert_eq!(provider, Provider::Claude);
        assert_eq!(request.max_tokens, DEFAULT_COMPLETION_TOKENS);
        assert!(request.system.is_none());
    }

    #[test]
    fn test_completion_rejects_blank_prompt() {
        let err = CompletionBody {
            prompt: Some("  ".to_string()),
            ..CompletionBody::default()
        }
        .into_request()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_completion_rejects_out_of_range_settings() {
        let too_many = CompletionBody {
            prompt: Some("x".to_string()),
            max_tokens: Some(100_000),
            ..CompletionBody::default()
        };
        assert!(too_many.into_request().is_err());

        let too_hot = CompletionBody {
            prompt: Some("x".to_string()),
            temperature: Some(1.5),
            ..CompletionBody::default()
        };
        assert!(too_hot.into_request().is_err());
    }
}
