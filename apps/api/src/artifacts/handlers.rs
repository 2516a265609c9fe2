use axum::{extract::rejection::JsonRejection, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::pipeline::{ApiResponse, Stopwatch};
use crate::artifacts::{build_artifacts, digest, Artifact, ModuleInput};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRequest {
    pub technology: Option<String>,
    #[serde(default)]
    pub analyses: Vec<ModuleInput>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactData {
    pub technology: String,
    pub artifacts: Vec<Artifact>,
}

/// POST /api/artifacts
///
/// Takes the analysis replies the client holds and returns the JSON export,
/// report layout, and chart geometry built from them. No vendor call is made.
pub async fn handle_artifacts(
    payload: Result<Json<ArtifactRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ArtifactData>>, AppError> {
    let Json(request) = payload?;
    let technology = request.technology.as_deref().map(str::trim).unwrap_or_default();
    if technology.is_empty() {
        return Err(AppError::Validation("technology is required".to_string()));
    }
    if request.analyses.is_empty() {
        return Err(AppError::Validation(
            "analyses must contain at least one module".to_string(),
        ));
    }

    let watch = Stopwatch::start();
    let modules: Vec<_> = request
        .analyses
        .iter()
        .map(|m| digest(m.kind, &m.analysis))
        .collect();
    let artifacts = build_artifacts(technology, &modules, Utc::now())?;
    info!("Built {} artifacts for '{technology}'", artifacts.len());

    Ok(Json(ApiResponse::ok(
        ArtifactData {
            technology: technology.to_string(),
            artifacts,
        },
        &watch,
    )))
}
