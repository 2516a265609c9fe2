//! Numeric and list scrapers that turn section text into chartable highlights.
//!
//! All of these are pattern matches over model prose. A value that cannot be
//! found is `None` or an empty list; nothing here returns an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::extractor::Extraction;
use crate::analysis::kinds::AnalysisKind;
use crate::analysis::quadrant::{parse_quadrant, QuadrantParse};

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

static OUT_OF_TEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*10\b").unwrap());

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\$|USD|US\$)\s?(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*(trillion|billion|million|bn|tn|[TBM])\b")
        .unwrap()
});

static CAGR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CAGR[^0-9\n]{0,40}?(\d+(?:\.\d+)?)\s*%|(\d+(?:\.\d+)?)\s*%\s*(?:\(\s*)?CAGR").unwrap()
});

static YEAR_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(20\d{2})\b[^\n%]{0,60}?(\d{1,3}(?:\.\d+)?)\s*%").unwrap()
});

static LIST_VENDOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*•]|\d+[.)])[ \t]+\**[ \t]*([A-Z0-9][^:*\n–—]{0,58}?)[ \t]*\**[ \t]*(?::|[–—]|\s-\s)")
        .unwrap()
});

/// Hype cycle phases, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HypePhase {
    #[serde(rename = "Innovation Trigger")]
    InnovationTrigger,
    #[serde(rename = "Peak of Inflated Expectations")]
    PeakOfInflatedExpectations,
    #[serde(rename = "Trough of Disillusionment")]
    TroughOfDisillusionment,
    #[serde(rename = "Slope of Enlightenment")]
    SlopeOfEnlightenment,
    #[serde(rename = "Plateau of Productivity")]
    PlateauOfProductivity,
}

impl HypePhase {
    const MARKERS: [(&'static str, HypePhase); 5] = [
        ("innovation trigger", HypePhase::InnovationTrigger),
        ("peak of inflated", HypePhase::PeakOfInflatedExpectations),
        ("trough of disillusion", HypePhase::TroughOfDisillusionment),
        ("slope of enlightenment", HypePhase::SlopeOfEnlightenment),
        ("plateau of productivity", HypePhase::PlateauOfProductivity),
    ];

    /// The phase mentioned earliest in `text`.
    pub fn find_in(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::MARKERS
            .iter()
            .filter_map(|(marker, phase)| lower.find(marker).map(|pos| (pos, *phase)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, phase)| phase)
    }

    pub fn label(self) -> &'static str {
        match self {
            HypePhase::InnovationTrigger => "Innovation Trigger",
            HypePhase::PeakOfInflatedExpectations => "Peak of Inflated Expectations",
            HypePhase::TroughOfDisillusionment => "Trough of Disillusionment",
            HypePhase::SlopeOfEnlightenment => "Slope of Enlightenment",
            HypePhase::PlateauOfProductivity => "Plateau of Productivity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionPoint {
    pub year: u16,
    pub percent: f64,
}

/// Per-kind structured values pulled out of the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Highlights {
    Market {
        market_size_usd_billions: Option<f64>,
        cagr_percent: Option<f64>,
        percentages: Vec<f64>,
    },
    Vendor {
        vendors: Vec<String>,
    },
    Maturity {
        maturity_score: Option<f64>,
        hype_cycle_phase: Option<HypePhase>,
    },
    Forecast {
        adoption: Vec<AdoptionPoint>,
    },
    Quadrant(QuadrantParse),
}

/// Builds the highlights for `kind` from the raw reply and its sections.
pub fn highlights_for(kind: AnalysisKind, raw: &str, extraction: &Extraction) -> Highlights {
    // Prefer the section that should hold the value, fall back to the whole reply.
    let section_or_raw = |title: &str| {
        extraction
            .get(title)
            .filter(|s| !s.is_empty() && !extraction.fallback)
            .unwrap_or(raw)
    };

    match kind {
        AnalysisKind::Market => {
            let size_text = section_or_raw("MARKET SIZE & GROWTH");
            Highlights::Market {
                market_size_usd_billions: first_money_in_billions(size_text)
                    .or_else(|| first_money_in_billions(raw)),
                cagr_percent: cagr(size_text).or_else(|| cagr(raw)),
                percentages: percentages(raw),
            }
        }
        AnalysisKind::Vendor => {
            let mut vendors = list_vendors(section_or_raw("MARKET LEADERS"));
            for name in list_vendors(section_or_raw("EMERGING PLAYERS")) {
                if !vendors.iter().any(|v| v.eq_ignore_ascii_case(&name)) {
                    vendors.push(name);
                }
            }
            Highlights::Vendor { vendors }
        }
        AnalysisKind::Maturity => Highlights::Maturity {
            maturity_score: score_out_of_ten(section_or_raw("MATURITY ASSESSMENT"))
                .or_else(|| score_out_of_ten(raw)),
            hype_cycle_phase: HypePhase::find_in(section_or_raw("HYPE CYCLE POSITION"))
                .or_else(|| HypePhase::find_in(raw)),
        },
        AnalysisKind::Forecast => {
            let adoption = year_percentages(section_or_raw("ADOPTION FORECAST"));
            Highlights::Forecast {
                adoption: if adoption.is_empty() {
                    year_percentages(raw)
                } else {
                    adoption
                },
            }
        }
        // Vendor blocks are parsed from the whole reply: models often add
        // their own headings between blocks.
        AnalysisKind::Quadrant => Highlights::Quadrant(parse_quadrant(raw)),
    }
}

pub fn percentages(text: &str) -> Vec<f64> {
    PERCENT_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect()
}

pub fn score_out_of_ten(text: &str) -> Option<f64> {
    OUT_OF_TEN_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .find(|v| (0.0..=10.0).contains(v))
}

pub fn cagr(text: &str) -> Option<f64> {
    let caps = CAGR_RE.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))?
        .as_str()
        .parse()
        .ok()
}

/// First dollar amount with a scale word, normalised to billions.
pub fn first_money_in_billions(text: &str) -> Option<f64> {
    let caps = MONEY_RE.captures(text)?;
    let amount: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    match caps.get(2)?.as_str().to_lowercase().as_str() {
        "trillion" | "tn" | "t" => Some(amount * 1000.0),
        "billion" | "bn" | "b" => Some(amount),
        "million" | "m" => Some(amount / 1000.0),
        _ => None,
    }
}

/// `2026: 35% of enterprises` style pairs, first value per year, sorted by year.
pub fn year_percentages(text: &str) -> Vec<AdoptionPoint> {
    let mut points: Vec<AdoptionPoint> = Vec::new();
    for caps in YEAR_PERCENT_RE.captures_iter(text) {
        let (Some(year), Some(percent)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (Ok(year), Ok(percent)) = (year.as_str().parse::<u16>(), percent.as_str().parse::<f64>())
        else {
            continue;
        };
        if percent > 100.0 || points.iter().any(|p| p.year == year) {
            continue;
        }
        points.push(AdoptionPoint { year, percent });
    }
    points.sort_by_key(|p| p.year);
    points
}

/// Names from `- Name: positioning` style list lines.
pub fn list_vendors(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in LIST_VENDOR_RE.captures_iter(text) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str().trim().to_string();
        if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extractor::extract_sections;
    use crate::analysis::kinds::{FORECAST_SECTIONS, MARKET_SECTIONS, MATURITY_SECTIONS, VENDOR_SECTIONS};

    #[test]
    fn test_money_scales_to_billions() {
        assert_eq!(first_money_in_billions("valued at $4.2 billion in 2024"), Some(4.2));
        assert_eq!(first_money_in_billions("USD 850 million"), Some(0.85));
        assert_eq!(first_money_in_billions("a $1.1T opportunity"), Some(1100.0));
        assert_eq!(first_money_in_billions("$1,500 million in 2023"), Some(1.5));
        assert_eq!(first_money_in_billions("no figures here"), None);
    }

    #[test]
    fn test_cagr_both_word_orders() {
        assert_eq!(cagr("growing at a CAGR of 17.3% through 2030"), Some(17.3));
        assert_eq!(cagr("a 21% CAGR is expected"), Some(21.0));
        assert_eq!(cagr("growth is strong"), None);
    }

    #[test]
    fn test_score_out_of_ten_skips_out_of_range() {
        assert_eq!(score_out_of_ten("Maturity score: 6.5/10"), Some(6.5));
        assert_eq!(score_out_of_ten("rated 12/10 by fans, really 7 / 10"), Some(7.0));
        assert_eq!(score_out_of_ten("mature"), None);
    }

    #[test]
    fn test_year_percentages_sorted_and_deduped() {
        let text = "2027: 48% of enterprises\n2025: 22% of enterprises\n2026: 35%\n2025: 99%";
        let points = year_percentages(text);
        assert_eq!(
            points,
            vec![
                AdoptionPoint { year: 2025, percent: 22.0 },
                AdoptionPoint { year: 2026, percent: 35.0 },
                AdoptionPoint { year: 2027, percent: 48.0 },
            ]
        );
    }

    #[test]
    fn test_hype_phase_earliest_mention_wins() {
        let text = "Currently in the Trough of Disillusionment, expected to reach the Plateau of Productivity by 2030.";
        assert_eq!(HypePhase::find_in(text), Some(HypePhase::TroughOfDisillusionment));
        assert_eq!(HypePhase::find_in("unclear"), None);
    }

    #[test]
    fn test_list_vendors_reads_list_lines() {
        let text = "- Microsoft: broad suite\n- **Okta**: identity focus\n2. Zscaler – cloud proxy\n- microsoft: duplicate\nplain prose line";
        assert_eq!(list_vendors(text), vec!["Microsoft", "Okta", "Zscaler"]);
    }

    #[test]
    fn test_market_highlights_from_sections() {
        let raw = "**MARKET SIZE & GROWTH**\nValued at $38.4 billion with a CAGR of 16.9%.\n\n\
            **KEY DRIVERS**\nRegulation.\n\n**MARKET SEGMENTS**\nBFSI 28%.\n\n**REGIONAL OUTLOOK**\nNA 41%.";
        let extraction = extract_sections(raw, MARKET_SECTIONS);
        match highlights_for(AnalysisKind::Market, raw, &extraction) {
            Highlights::Market {
                market_size_usd_billions,
                cagr_percent,
                percentages,
            } => {
                assert_eq!(market_size_usd_billions, Some(38.4));
                assert_eq!(cagr_percent, Some(16.9));
                assert_eq!(percentages, vec![16.9, 28.0, 41.0]);
            }
            other => panic!("unexpected highlights {other:?}"),
        }
    }

    #[test]
    fn test_vendor_highlights_merge_leaders_and_emerging() {
        let raw = "**MARKET LEADERS**\n- Okta: identity\n- Zscaler: SSE\n\n\
            **EMERGING PLAYERS**\n- Twingate: ZTNA for SMB\n- Okta: again\n\n\
            **COMPETITIVE DYNAMICS**\nConsolidation.\n\n**SELECTION CRITERIA**\nIntegration.";
        let extraction = extract_sections(raw, VENDOR_SECTIONS);
        let Highlights::Vendor { vendors } = highlights_for(AnalysisKind::Vendor, raw, &extraction)
        else {
            panic!("expected vendor highlights");
        };
        assert_eq!(vendors, vec!["Okta", "Zscaler", "Twingate"]);
    }

    #[test]
    fn test_maturity_highlights_fall_back_to_raw_text() {
        let raw = "It sits at the Slope of Enlightenment. Maturity score: 7/10.";
        let extraction = extract_sections(raw, MATURITY_SECTIONS);
        assert!(extraction.fallback);
        let Highlights::Maturity {
            maturity_score,
            hype_cycle_phase,
        } = highlights_for(AnalysisKind::Maturity, raw, &extraction)
        else {
            panic!("expected maturity highlights");
        };
        assert_eq!(maturity_score, Some(7.0));
        assert_eq!(hype_cycle_phase, Some(HypePhase::SlopeOfEnlightenment));
    }

    #[test]
    fn test_forecast_highlights_serialize_with_kind_tag() {
        let raw = "**ADOPTION FORECAST**\n2025: 30% of enterprises\n2026: 41% of enterprises";
        let extraction = extract_sections(raw, FORECAST_SECTIONS);
        let value = serde_json::to_value(highlights_for(AnalysisKind::Forecast, raw, &extraction)).unwrap();
        assert_eq!(value["kind"], "forecast");
        assert_eq!(value["adoption"][1]["year"], 2026);
        assert_eq!(value["adoption"][1]["percent"], 41.0);
    }
}
