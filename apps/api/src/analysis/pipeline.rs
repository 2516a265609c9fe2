//! Analysis pipeline: prompt, one vendor call, extraction, payload.
//!
//! Shared by every analysis route and by the comprehensive orchestrator. All
//! LLM calls go through `AppState::llm`; nothing here talks HTTP directly.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{extract_sections, ExtractedSection};
use crate::analysis::kinds::{profile, AnalysisKind};
use crate::analysis::metrics::{highlights_for, Highlights};
use crate::errors::AppError;
use crate::llm_client::prompts::{ANALYST_SYSTEM, WEB_CONTEXT_HEADER};
use crate::llm_client::{CompletionRequest, Provider, Usage};
use crate::search::{format_for_prompt, technology_query, SearchHit};
use crate::state::AppState;

const MAX_TECHNOLOGY_CHARS: usize = 200;
const WEB_CONTEXT_RESULTS: usize = 5;

/// Request body shared by all analysis routes.
///
/// `technology` is optional here so a missing field is reported as a
/// validation error with our JSON body rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub technology: Option<String>,
    pub vendor: Option<String>,
    pub provider: Option<Provider>,
    /// Analysis kind for the single-entry `/api/analyze` route.
    pub endpoint: Option<String>,
    #[serde(default)]
    pub include_web_context: bool,
}

impl AnalysisRequest {
    /// The trimmed technology name, or a validation error.
    pub fn technology(&self) -> Result<&str, AppError> {
        let technology = self.technology.as_deref().map(str::trim).unwrap_or_default();
        if technology.is_empty() {
            return Err(AppError::Validation("technology is required".to_string()));
        }
        if technology.chars().count() > MAX_TECHNOLOGY_CHARS {
            return Err(AppError::Validation(format!(
                "technology must be at most {MAX_TECHNOLOGY_CHARS} characters"
            )));
        }
        Ok(technology)
    }

    fn vendor(&self) -> Option<&str> {
        self.vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub id: Uuid,
    pub kind: AnalysisKind,
    pub technology: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub provider: Provider,
    pub model: String,
    /// The vendor reply exactly as received.
    pub analysis: String,
    pub sections: Vec<ExtractedSection>,
    /// True when no expected heading was found and `sections` is a length split.
    pub fallback: bool,
    pub highlights: Highlights,
    pub usage: Usage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub web_context: Vec<SearchHit>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Wall-clock start plus a monotonic clock for the duration.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: DateTime<Utc>,
    instant: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            instant: Instant::now(),
        }
    }

    pub fn finish(&self) -> Timing {
        Timing {
            started_at: self.started_at,
            duration_ms: u64::try_from(self.instant.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Success envelope shared by every analysis-style route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timing: Timing,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, watch: &Stopwatch) -> Self {
        Self {
            success: true,
            data,
            timing: watch.finish(),
        }
    }
}

/// Runs one analysis of `kind` for the request.
pub async fn run_analysis(
    state: &AppState,
    kind: AnalysisKind,
    request: &AnalysisRequest,
) -> Result<AnalysisData, AppError> {
    let technology = request.technology()?;
    let web_context = if request.include_web_context {
        fetch_web_context(state, technology).await
    } else {
        Vec::new()
    };
    run_analysis_with_context(state, kind, request, web_context).await
}

/// Runs one analysis with web context the caller already fetched.
pub async fn run_analysis_with_context(
    state: &AppState,
    kind: AnalysisKind,
    request: &AnalysisRequest,
    web_context: Vec<SearchHit>,
) -> Result<AnalysisData, AppError> {
    let technology = request.technology()?;
    let vendor = request.vendor();
    let profile = profile(kind);
    let provider = request.provider.unwrap_or(profile.default_provider);

    let mut prompt = profile.build_prompt(technology, vendor);
    if !web_context.is_empty() {
        prompt = format!(
            "{prompt}\n\n{WEB_CONTEXT_HEADER}\n{}",
            format_for_prompt(&web_context)
        );
    }

    info!("Running {kind} analysis for '{technology}' via {provider}");
    let completion = state
        .llm
        .complete(
            provider,
            &CompletionRequest {
                prompt,
                system: Some(ANALYST_SYSTEM.to_string()),
                max_tokens: profile.max_tokens,
                temperature: profile.temperature,
            },
        )
        .await?;

    let extraction = extract_sections(&completion.raw_text, profile.sections);
    if extraction.fallback {
        warn!(
            "{kind} analysis for '{technology}': no expected headings found, using length split"
        );
    }
    let highlights = highlights_for(kind, &completion.raw_text, &extraction);

    Ok(AnalysisData {
        id: Uuid::new_v4(),
        kind,
        technology: technology.to_string(),
        vendor: vendor.map(str::to_string),
        provider: completion.provider,
        model: completion.model,
        analysis: completion.raw_text,
        sections: extraction.sections,
        fallback: extraction.fallback,
        highlights,
        usage: completion.usage,
        web_context,
    })
}

/// Search failures degrade to no context; the analysis still runs.
pub async fn fetch_web_context(state: &AppState, technology: &str) -> Vec<SearchHit> {
    if !state.search.is_configured() {
        warn!("Web context requested but no search backend key is configured");
        return Vec::new();
    }
    match state
        .search
        .search(&technology_query(technology), WEB_CONTEXT_RESULTS)
        .await
    {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Web context search failed: {e}");
            Vec::new()
        }
    }
}
