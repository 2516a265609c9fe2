use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::extractor::ExtractedSection;
use crate::analysis::kinds::AnalysisKind;
use crate::analysis::metrics::Highlights;
use crate::artifacts::ModuleDigest;

/// The aggregate state as written to the downloadable JSON file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub technology: &'a str,
    pub generated_at: DateTime<Utc>,
    pub modules: Vec<ExportModule<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportModule<'a> {
    pub kind: AnalysisKind,
    pub analysis: &'a str,
    pub sections: &'a [ExtractedSection],
    pub fallback: bool,
    pub highlights: &'a Highlights,
}

pub fn export_document<'a>(
    technology: &'a str,
    modules: &'a [ModuleDigest],
    generated_at: DateTime<Utc>,
) -> ExportDocument<'a> {
    ExportDocument {
        technology,
        generated_at,
        modules: modules
            .iter()
            .map(|m| ExportModule {
                kind: m.kind,
                analysis: &m.analysis,
                sections: &m.extraction.sections,
                fallback: m.extraction.fallback,
                highlights: &m.highlights,
            })
            .collect(),
    }
}

/// `techscope-<technology-slug>-<YYYY-MM-DD>.<extension>`
pub fn artifact_filename(technology: &str, at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "techscope-{}-{}.{extension}",
        slugify(technology),
        at.format("%Y-%m-%d")
    )
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "analysis".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::digest;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_filename_slug_and_date() {
        assert_eq!(
            artifact_filename("Zero Trust Security", at(), "json"),
            "techscope-zero-trust-security-2026-10-15.json"
        );
        assert_eq!(
            artifact_filename("  C++ / Rust!! ", at(), "pdf"),
            "techscope-c-rust-2026-10-15.pdf"
        );
        assert_eq!(artifact_filename("***", at(), "json"), "techscope-analysis-2026-10-15.json");
    }

    #[test]
    fn test_export_document_serializes_modules() {
        let modules = vec![digest(AnalysisKind::Maturity, "Maturity score: 6/10")];
        let doc = export_document("Edge AI", &modules, at());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["technology"], "Edge AI");
        assert_eq!(value["modules"][0]["kind"], "maturity");
        assert_eq!(value["modules"][0]["analysis"], "Maturity score: 6/10");
        assert_eq!(value["modules"][0]["highlights"]["maturityScore"], 6.0);
        assert_eq!(value["generatedAt"], "2026-10-15T09:30:00Z");
    }
}
