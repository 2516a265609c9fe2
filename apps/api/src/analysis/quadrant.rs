//! Quadrant positioning — parses `VENDOR:` blocks into scored vendor records.
//!
//! Expected block shape (one per vendor, anywhere in the reply):
//!
//! ```text
//! VENDOR: Okta
//! QUADRANT: Leaders
//! ABILITY TO EXECUTE: 8.7
//! COMPLETENESS OF VISION: 8.1
//! PRODUCT/SERVICE: 9
//! ... eleven more factor lines
//! ```
//!
//! A vendor is kept only when both axis scores parse and at least
//! `MIN_SUBSCORES` of the twelve factor scores parse. Anything less is dropped
//! and reported by name; no substitute vendor is invented.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_SUBSCORES: usize = 8;

/// Axis score at or above which a vendor counts as strong on that axis.
pub const QUADRANT_THRESHOLD: f64 = 5.0;

static VENDOR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t>#*-]*(?:\d+[.)][ \t]*)?\**[ \t]*VENDOR(?:[ \t]+NAME)?[ \t]*\d*[ \t]*\**[ \t]*:[ \t]*\**[ \t]*([^\n]+?)[ \t*]*$",
    )
    .unwrap()
});

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)(?:\s*/\s*(10|100)\b)?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Execution,
    Vision,
}

/// One of the twelve evaluation factors.
#[derive(Debug, Clone, Copy)]
pub struct Factor {
    pub key: &'static str,
    pub label: &'static str,
    pub axis: Axis,
    aliases: &'static [&'static str],
}

pub static FACTORS: [Factor; 12] = [
    Factor { key: "productService", label: "Product/Service", axis: Axis::Execution, aliases: &["PRODUCT", "PRODUCT OR SERVICE", "PRODUCT SERVICES"] },
    Factor { key: "overallViability", label: "Overall Viability", axis: Axis::Execution, aliases: &["VIABILITY"] },
    Factor { key: "salesExecution", label: "Sales Execution/Pricing", axis: Axis::Execution, aliases: &["SALES EXECUTION", "PRICING"] },
    Factor { key: "marketResponsiveness", label: "Market Responsiveness", axis: Axis::Execution, aliases: &["MARKET RESPONSIVENESS TRACK RECORD", "RESPONSIVENESS"] },
    Factor { key: "marketingExecution", label: "Marketing Execution", axis: Axis::Execution, aliases: &[] },
    Factor { key: "customerExperience", label: "Customer Experience", axis: Axis::Execution, aliases: &["CUSTOMER SATISFACTION"] },
    Factor { key: "marketUnderstanding", label: "Market Understanding", axis: Axis::Vision, aliases: &[] },
    Factor { key: "marketingStrategy", label: "Marketing Strategy", axis: Axis::Vision, aliases: &[] },
    Factor { key: "salesStrategy", label: "Sales Strategy", axis: Axis::Vision, aliases: &[] },
    Factor { key: "offeringStrategy", label: "Offering Strategy", axis: Axis::Vision, aliases: &["PRODUCT STRATEGY", "OFFERING PRODUCT STRATEGY"] },
    Factor { key: "innovation", label: "Innovation", axis: Axis::Vision, aliases: &[] },
    Factor { key: "geographicStrategy", label: "Geographic Strategy", axis: Axis::Vision, aliases: &["GEOGRAPHIC"] },
];

const EXECUTE_LABELS: &[&str] = &["ABILITY TO EXECUTE", "EXECUTION", "EXECUTION SCORE"];
const VISION_LABELS: &[&str] = &["COMPLETENESS OF VISION", "VISION", "VISION SCORE"];
const QUADRANT_LABELS: &[&str] = &["QUADRANT", "POSITION", "CATEGORY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    Leaders,
    Challengers,
    Visionaries,
    #[serde(rename = "Niche Players")]
    NichePlayers,
}

impl Quadrant {
    pub fn from_scores(ability_to_execute: f64, completeness_of_vision: f64) -> Self {
        match (
            ability_to_execute >= QUADRANT_THRESHOLD,
            completeness_of_vision >= QUADRANT_THRESHOLD,
        ) {
            (true, true) => Quadrant::Leaders,
            (true, false) => Quadrant::Challengers,
            (false, true) => Quadrant::Visionaries,
            (false, false) => Quadrant::NichePlayers,
        }
    }

    /// Recognises the label however the model phrased it ("Leader", "niche player").
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("leader") {
            Some(Quadrant::Leaders)
        } else if lower.contains("challenger") {
            Some(Quadrant::Challengers)
        } else if lower.contains("visionar") {
            Some(Quadrant::Visionaries)
        } else if lower.contains("niche") {
            Some(Quadrant::NichePlayers)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::Leaders => "Leaders",
            Quadrant::Challengers => "Challengers",
            Quadrant::Visionaries => "Visionaries",
            Quadrant::NichePlayers => "Niche Players",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuadrantSource {
    /// Taken from the model's `QUADRANT:` line.
    Stated,
    /// Computed from the axis scores because no usable label was given.
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorScoreRecord {
    pub name: String,
    pub quadrant: Quadrant,
    pub quadrant_source: QuadrantSource,
    pub ability_to_execute: f64,
    pub completeness_of_vision: f64,
    /// Factor key → score (0–10). Between 8 and 12 entries.
    pub subscores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardedVendor {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadrantParse {
    pub vendors: Vec<VendorScoreRecord>,
    pub discarded: Vec<DiscardedVendor>,
}

/// Parses every vendor block in `text`.
pub fn parse_quadrant(text: &str) -> QuadrantParse {
    let headers: Vec<(usize, usize, String)> = VENDOR_LINE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = clean_name(caps.get(1)?.as_str());
            (!name.is_empty()).then(|| (whole.start(), whole.end(), name))
        })
        .collect();

    let mut result = QuadrantParse::default();
    for (i, (_, body_start, name)) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map_or(text.len(), |next| next.0);
        let body = &text[*body_start..body_end];

        if result
            .vendors
            .iter()
            .any(|v| v.name.eq_ignore_ascii_case(name))
        {
            continue;
        }

        match parse_block(name, body) {
            Ok(record) => result.vendors.push(record),
            Err(reason) => {
                debug!("Dropping vendor '{name}': {reason}");
                result.discarded.push(DiscardedVendor {
                    name: name.clone(),
                    reason,
                });
            }
        }
    }
    result
}

fn parse_block(name: &str, body: &str) -> Result<VendorScoreRecord, String> {
    let mut ability_to_execute = None;
    let mut completeness_of_vision = None;
    let mut stated_quadrant = None;
    let mut subscores = BTreeMap::new();

    for line in body.lines() {
        let Some((label, value)) = split_field(line) else {
            continue;
        };

        if QUADRANT_LABELS.contains(&label.as_str()) {
            stated_quadrant = stated_quadrant.or_else(|| Quadrant::from_label(value));
        } else if EXECUTE_LABELS.contains(&label.as_str()) {
            ability_to_execute = ability_to_execute.or_else(|| parse_score(value));
        } else if VISION_LABELS.contains(&label.as_str()) {
            completeness_of_vision = completeness_of_vision.or_else(|| parse_score(value));
        } else if let Some(factor) = factor_for(&label) {
            if let Some(score) = parse_score(value) {
                subscores.entry(factor.key.to_string()).or_insert(score);
            }
        }
    }

    let (Some(ability_to_execute), Some(completeness_of_vision)) =
        (ability_to_execute, completeness_of_vision)
    else {
        return Err("missing ability to execute or completeness of vision".to_string());
    };
    if subscores.len() < MIN_SUBSCORES {
        return Err(format!(
            "only {} of {} factor scores parsed",
            subscores.len(),
            FACTORS.len()
        ));
    }

    let (quadrant, quadrant_source) = match stated_quadrant {
        Some(q) => (q, QuadrantSource::Stated),
        None => (
            Quadrant::from_scores(ability_to_execute, completeness_of_vision),
            QuadrantSource::Derived,
        ),
    };

    Ok(VendorScoreRecord {
        name: name.to_string(),
        quadrant,
        quadrant_source,
        ability_to_execute,
        completeness_of_vision,
        subscores,
    })
}

/// `- **Overall Viability:** 8/10` → (`OVERALL VIABILITY`, `8/10`).
fn split_field(line: &str) -> Option<(String, &str)> {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || "-*•>#".contains(c));
    let (label, value) = line.split_once(':')?;
    let value = value.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
    Some((normalize_label(label), value))
}

fn normalize_label(label: &str) -> String {
    label
        .to_uppercase()
        .replace('&', " AND ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn factor_for(label: &str) -> Option<&'static Factor> {
    FACTORS.iter().find(|f| {
        normalize_label(f.label) == label || f.aliases.iter().any(|a| *a == label)
    })
}

/// First number in `value`, on a 0–10 scale. `85/100` is rescaled.
fn parse_score(value: &str) -> Option<f64> {
    let caps = SCORE_RE.captures(value)?;
    let mut score: f64 = caps.get(1)?.as_str().parse().ok()?;
    if caps.get(2).is_some_and(|scale| scale.as_str() == "100") {
        score /= 10.0;
    }
    (0.0..=10.0).contains(&score).then_some(score)
}

fn clean_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a vendor block with the first `factor_count` factor lines filled in.
    fn block(name: &str, execute: &str, vision: &str, factor_count: usize) -> String {
        let mut out = format!("VENDOR: {name}\nQUADRANT: Leaders\n");
        if !execute.is_empty() {
            out.push_str(&format!("ABILITY TO EXECUTE: {execute}\n"));
        }
        if !vision.is_empty() {
            out.push_str(&format!("COMPLETENESS OF VISION: {vision}\n"));
        }
        for factor in FACTORS.iter().take(factor_count) {
            out.push_str(&format!("{}: 7.5\n", factor.label.to_uppercase()));
        }
        for factor in FACTORS.iter().skip(factor_count) {
            out.push_str(&format!("{}: n/a\n", factor.label.to_uppercase()));
        }
        out.push('\n');
        out
    }

    #[test]
    fn test_seven_subscores_is_excluded() {
        let text = block("Okta", "8.5", "8.0", 7);
        let result = parse_quadrant(&text);
        assert!(result.vendors.is_empty());
        assert_eq!(result.discarded.len(), 1);
        assert_eq!(result.discarded[0].name, "Okta");
        assert!(result.discarded[0].reason.contains("only 7"));
    }

    #[test]
    fn test_eight_subscores_is_included() {
        let text = block("Okta", "8.5", "8.0", 8);
        let result = parse_quadrant(&text);
        assert_eq!(result.vendors.len(), 1);
        let okta = &result.vendors[0];
        assert_eq!(okta.name, "Okta");
        assert_eq!(okta.subscores.len(), 8);
        assert_eq!(okta.ability_to_execute, 8.5);
        assert_eq!(okta.completeness_of_vision, 8.0);
    }

    #[test]
    fn test_missing_axis_score_is_excluded() {
        let text = block("Cisco", "7.9", "", 12);
        let result = parse_quadrant(&text);
        assert!(result.vendors.is_empty());
        assert!(result.discarded[0].reason.contains("completeness of vision"));
    }

    #[test]
    fn test_multiple_blocks_are_split_per_vendor() {
        let text = format!(
            "**VENDOR POSITIONS**\n{}{}{}",
            block("Zscaler", "8.8", "8.4", 12),
            block("Palo Alto Networks", "8.6", "8.7", 10),
            block("Tiny Startup", "3.0", "4.0", 5)
        );
        let result = parse_quadrant(&text);
        let names: Vec<_> = result.vendors.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Zscaler", "Palo Alto Networks"]);
        assert_eq!(result.discarded.len(), 1);
        assert_eq!(result.vendors[1].subscores.len(), 10);
    }

    #[test]
    fn test_markdown_decorated_block_parses() {
        let text = "1. **VENDOR:** Cloudflare\n\
            - **Quadrant:** Visionary\n\
            - **Ability to Execute:** 6.5/10\n\
            - **Completeness of Vision:** 8.2/10\n\
            - Product/Service: 8\n- Overall Viability: 7\n- Sales Execution/Pricing: 6\n\
            - Market Responsiveness: 7\n- Marketing Execution: 6\n- Customer Experience: 7\n\
            - Market Understanding: 8\n- Innovation: 9\n";
        let result = parse_quadrant(text);
        assert_eq!(result.vendors.len(), 1);
        let v = &result.vendors[0];
        assert_eq!(v.name, "Cloudflare");
        assert_eq!(v.quadrant, Quadrant::Visionaries);
        assert_eq!(v.quadrant_source, QuadrantSource::Stated);
        assert_eq!(v.ability_to_execute, 6.5);
        assert_eq!(v.subscores["innovation"], 9.0);
    }

    #[test]
    fn test_quadrant_derived_when_label_missing() {
        let text = block("Fortinet", "7.0", "4.0", 12).replace("QUADRANT: Leaders\n", "");
        let result = parse_quadrant(&text);
        assert_eq!(result.vendors[0].quadrant, Quadrant::Challengers);
        assert_eq!(result.vendors[0].quadrant_source, QuadrantSource::Derived);
    }

    #[test]
    fn test_out_of_range_scores_do_not_count() {
        let text = block("Acme", "85/100", "11", 12);
        let result = parse_quadrant(&text);
        // 85/100 rescales to 8.5, but 11 is out of range
        assert!(result.vendors.is_empty());
    }

    #[test]
    fn test_duplicate_vendor_keeps_first_block() {
        let text = format!(
            "{}{}",
            block("Okta", "8.5", "8.0", 12),
            block("OKTA", "2.0", "2.0", 12)
        );
        let result = parse_quadrant(&text);
        assert_eq!(result.vendors.len(), 1);
        assert_eq!(result.vendors[0].ability_to_execute, 8.5);
    }

    #[test]
    fn test_from_scores_threshold() {
        assert_eq!(Quadrant::from_scores(5.0, 5.0), Quadrant::Leaders);
        assert_eq!(Quadrant::from_scores(4.9, 5.0), Quadrant::Visionaries);
        assert_eq!(Quadrant::from_scores(4.9, 4.9), Quadrant::NichePlayers);
    }

    #[test]
    fn test_quadrant_serializes_with_space() {
        assert_eq!(
            serde_json::to_string(&Quadrant::NichePlayers).unwrap(),
            "\"Niche Players\""
        );
    }

    #[test]
    fn test_no_vendor_lines_yields_empty_result() {
        let result = parse_quadrant("The market is fragmented and no clear leader exists.");
        assert!(result.vendors.is_empty());
        assert!(result.discarded.is_empty());
    }
}
