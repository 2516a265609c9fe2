//! Turns analysis replies into downloadable artifacts.
//!
//! Produces the data each artifact is drawn from: a JSON export, a paginated
//! report layout, and chart geometry. Encoding PDF or PNG bytes is left to
//! the client.

pub mod chart;
pub mod document;
pub mod export;
pub mod font_metrics;
pub mod handlers;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::extractor::{extract_sections, Extraction};
use crate::analysis::kinds::{profile, AnalysisKind};
use crate::analysis::metrics::{highlights_for, Highlights};
use crate::errors::AppError;

use self::chart::{forecast_chart, metric_bars, quadrant_chart};
use self::document::layout_report;
use self::export::{artifact_filename, export_document};
use self::font_metrics::default_page_setup;

/// One module's reply as posted back by the client. Extra fields (for
/// example a full analysis payload) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    pub kind: AnalysisKind,
    pub analysis: String,
}

/// A module reply with extraction and highlights recomputed server-side.
#[derive(Debug, Clone)]
pub struct ModuleDigest {
    pub kind: AnalysisKind,
    pub analysis: String,
    pub extraction: Extraction,
    pub highlights: Highlights,
}

pub fn digest(kind: AnalysisKind, analysis: &str) -> ModuleDigest {
    let extraction = extract_sections(analysis, profile(kind).sections);
    let highlights = highlights_for(kind, analysis, &extraction);
    ModuleDigest {
        kind,
        analysis: analysis.to_string(),
        extraction,
        highlights,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Image,
    Json,
}

impl ArtifactKind {
    pub fn media_type(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "application/pdf",
            ArtifactKind::Image => "image/png",
            ArtifactKind::Json => "application/json",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Image => "png",
            ArtifactKind::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub name: String,
    pub title: String,
    pub description: String,
    pub media_type: &'static str,
    /// JSON text for `json`; layout or chart geometry for `pdf` / `image`.
    pub content: Value,
}

impl Artifact {
    fn new(
        kind: ArtifactKind,
        name: String,
        title: String,
        description: String,
        content: Value,
    ) -> Self {
        Self {
            kind,
            name,
            title,
            description,
            media_type: kind.media_type(),
            content,
        }
    }
}

/// Builds every artifact the modules support: always the JSON export and the
/// report, plus one chart per module that carries plottable numbers.
pub fn build_artifacts(
    technology: &str,
    modules: &[ModuleDigest],
    now: DateTime<Utc>,
) -> Result<Vec<Artifact>, AppError> {
    let mut artifacts = Vec::new();

    let export = serde_json::to_string_pretty(&export_document(technology, modules, now))
        .context("Failed to serialize JSON export")?;
    artifacts.push(Artifact::new(
        ArtifactKind::Json,
        artifact_filename(technology, now, ArtifactKind::Json.extension()),
        format!("{technology} analysis data"),
        format!("Raw replies, sections and highlights for {} modules", modules.len()),
        Value::String(export),
    ));

    let layout = layout_report(
        technology,
        &now.format("%Y-%m-%d").to_string(),
        modules,
        &default_page_setup(),
    );
    let page_count = layout.pages.len();
    artifacts.push(Artifact::new(
        ArtifactKind::Pdf,
        artifact_filename(technology, now, ArtifactKind::Pdf.extension()),
        format!("{technology} report"),
        format!("{page_count}-page report layout"),
        serde_json::to_value(&layout).context("Failed to serialize report layout")?,
    ));

    for module in modules {
        let chart = match &module.highlights {
            Highlights::Quadrant(parse) if !parse.vendors.is_empty() => Some((
                "quadrant",
                format!("{technology} vendor quadrant"),
                format!("{} vendors positioned by vision and execution", parse.vendors.len()),
                serde_json::to_value(quadrant_chart(&parse.vendors)),
            )),
            Highlights::Forecast { adoption } if !adoption.is_empty() => Some((
                "forecast",
                format!("{technology} adoption forecast"),
                format!("Adoption across {} forecast years", adoption.len()),
                serde_json::to_value(forecast_chart(adoption)),
            )),
            _ => None,
        };
        if let Some((slug, title, description, content)) = chart {
            artifacts.push(Artifact::new(
                ArtifactKind::Image,
                artifact_filename(&format!("{technology} {slug}"), now, ArtifactKind::Image.extension()),
                title,
                description,
                content.context("Failed to serialize chart geometry")?,
            ));
        }
    }

    let highlights: Vec<&Highlights> = modules.iter().map(|m| &m.highlights).collect();
    let bars = metric_bars(&highlights);
    if !bars.bars.is_empty() {
        artifacts.push(Artifact::new(
            ArtifactKind::Image,
            artifact_filename(&format!("{technology} metrics"), now, ArtifactKind::Image.extension()),
            format!("{technology} key metrics"),
            format!("{} headline figures", bars.bars.len()),
            serde_json::to_value(&bars).context("Failed to serialize chart geometry")?,
        ));
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const QUADRANT_REPLY: &str = "VENDOR: Zscaler
QUADRANT: Leader
ABILITY TO EXECUTE: 8.5/10
COMPLETENESS OF VISION: 8/10
Product/Service: 9
Overall Viability: 8
Sales Execution/Pricing: 8
Market Responsiveness: 9
Marketing Execution: 7
Customer Experience: 8
Market Understanding: 9
Marketing Strategy: 7
Sales Strategy: 8
Offering Strategy: 9
Innovation: 9
Geographic Strategy: 8
";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_json_and_report_always_present() {
        let modules = vec![digest(AnalysisKind::Vendor, "Nothing structured here.")];
        let artifacts = build_artifacts("Edge AI", &modules, now()).unwrap();
        let kinds: Vec<ArtifactKind> = artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Json, ArtifactKind::Pdf]);
        assert_eq!(artifacts[0].name, "techscope-edge-ai-2026-10-15.json");
        assert_eq!(artifacts[0].media_type, "application/json");
        let export: Value =
            serde_json::from_str(artifacts[0].content.as_str().unwrap()).unwrap();
        assert_eq!(export["modules"][0]["analysis"], "Nothing structured here.");
    }

    #[test]
    fn test_charts_for_quadrant_forecast_and_market() {
        let modules = vec![
            digest(AnalysisKind::Quadrant, QUADRANT_REPLY),
            digest(
                AnalysisKind::Forecast,
                "**ADOPTION FORECAST**\n2026: 30% of enterprises\n2028: 55% of enterprises",
            ),
            digest(
                AnalysisKind::Market,
                "**MARKET SIZE & GROWTH**\nThe market reached $38 billion with a CAGR of 17%.",
            ),
        ];
        let artifacts = build_artifacts("Zero Trust Security", &modules, now()).unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"techscope-zero-trust-security-quadrant-2026-10-15.png"));
        assert!(names.contains(&"techscope-zero-trust-security-forecast-2026-10-15.png"));
        assert!(names.contains(&"techscope-zero-trust-security-metrics-2026-10-15.png"));

        let quadrant = artifacts
            .iter()
            .find(|a| a.name.contains("quadrant"))
            .unwrap();
        assert_eq!(quadrant.content["points"][0]["name"], "Zscaler");
        assert_eq!(quadrant.content["canvas"]["width"], 800.0);
    }
}
