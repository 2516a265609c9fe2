//! Comprehensive analysis: market, vendor, maturity and forecast in parallel.

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::kinds::AnalysisKind;
use crate::analysis::pipeline::{
    fetch_web_context, run_analysis_with_context, AnalysisData, AnalysisRequest, Stopwatch,
};
use crate::errors::AppError;
use crate::state::AppState;

/// One module's outcome inside a comprehensive run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub kind: AnalysisKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisData>,
    /// Same body a single-module request would have returned on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveData {
    pub technology: String,
    pub succeeded: usize,
    pub failed: usize,
    pub modules: Vec<ModuleResult>,
}

/// Runs every comprehensive module concurrently. Succeeds when at least one
/// module did; if all failed, the first module's error is returned as is.
pub async fn run_comprehensive(
    state: &AppState,
    request: &AnalysisRequest,
) -> Result<ComprehensiveData, AppError> {
    let technology = request.technology()?.to_string();

    // One search shared by every module.
    let web_context = if request.include_web_context {
        fetch_web_context(state, &technology).await
    } else {
        Vec::new()
    };

    let runs = AnalysisKind::COMPREHENSIVE.iter().map(|&kind| {
        let web_context = web_context.clone();
        async move {
            let watch = Stopwatch::start();
            let result = run_analysis_with_context(state, kind, request, web_context).await;
            (kind, result, watch.finish().duration_ms)
        }
    });
    let outcomes = join_all(runs).await;

    let mut modules = Vec::with_capacity(outcomes.len());
    let mut first_error = None;
    for (kind, result, duration_ms) in outcomes {
        match result {
            Ok(data) => modules.push(ModuleResult {
                kind,
                success: true,
                data: Some(data),
                error: None,
                duration_ms,
            }),
            Err(e) => {
                warn!("Comprehensive {kind} module for '{technology}' failed: {e}");
                modules.push(ModuleResult {
                    kind,
                    success: false,
                    data: None,
                    error: Some(e.to_body()),
                    duration_ms,
                });
                first_error.get_or_insert(e);
            }
        }
    }

    let succeeded = modules.iter().filter(|m| m.success).count();
    if succeeded == 0 {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    info!(
        "Comprehensive analysis for '{technology}': {succeeded}/{} modules succeeded",
        modules.len()
    );
    Ok(ComprehensiveData {
        technology,
        succeeded,
        failed: modules.len() - succeeded,
        modules,
    })
}
