//! Analysis kinds and their configuration table.
//!
//! The five analysis modules differ only in prompt text, section list, default
//! provider and token budget, so each is one row of `profile()` instead of its
//! own handler.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{
    FORECAST_TEMPLATE, MARKET_TEMPLATE, MATURITY_TEMPLATE, QUADRANT_TEMPLATE,
    VENDOR_FOCUS_TEMPLATE, VENDOR_TEMPLATE,
};
use crate::analysis::quadrant::FACTORS;
use crate::llm_client::prompts::word_ceiling;
use crate::llm_client::Provider;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Market,
    Vendor,
    Maturity,
    Forecast,
    Quadrant,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Market,
        AnalysisKind::Vendor,
        AnalysisKind::Maturity,
        AnalysisKind::Forecast,
        AnalysisKind::Quadrant,
    ];

    /// The kinds the comprehensive analysis runs together.
    pub const COMPREHENSIVE: [AnalysisKind; 4] = [
        AnalysisKind::Market,
        AnalysisKind::Vendor,
        AnalysisKind::Maturity,
        AnalysisKind::Forecast,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Market => "market",
            AnalysisKind::Vendor => "vendor",
            AnalysisKind::Maturity => "maturity",
            AnalysisKind::Forecast => "forecast",
            AnalysisKind::Quadrant => "quadrant",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    /// Accepts the bare kind as well as the route-style `market-analysis` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let bare = normalized
            .trim_start_matches("/api/")
            .trim_end_matches("-analysis")
            .trim_end_matches("_analysis");
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.as_str() == bare)
            .ok_or_else(|| format!("unknown analysis type '{s}'"))
    }
}

/// One row of the configuration table.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisProfile {
    pub kind: AnalysisKind,
    pub template: &'static str,
    pub sections: &'static [&'static str],
    pub default_provider: Provider,
    pub max_tokens: u32,
    pub temperature: f32,
    pub word_limit: u32,
}

pub const MARKET_SECTIONS: &[&str] = &[
    "MARKET SIZE & GROWTH",
    "KEY DRIVERS",
    "MARKET SEGMENTS",
    "REGIONAL OUTLOOK",
];

pub const VENDOR_SECTIONS: &[&str] = &[
    "MARKET LEADERS",
    "EMERGING PLAYERS",
    "COMPETITIVE DYNAMICS",
    "SELECTION CRITERIA",
];

pub const MATURITY_SECTIONS: &[&str] = &[
    "MATURITY ASSESSMENT",
    "HYPE CYCLE POSITION",
    "ADOPTION BARRIERS",
    "RECOMMENDATIONS",
];

pub const FORECAST_SECTIONS: &[&str] = &[
    "ADOPTION FORECAST",
    "GROWTH DRIVERS",
    "RISKS",
    "FUTURE OUTLOOK",
];

pub const QUADRANT_SECTIONS: &[&str] = &["MARKET OVERVIEW", "VENDOR POSITIONS", "KEY DIFFERENTIATORS"];

// Token ceilings are small on purpose: the hosting platform cuts requests off
// after roughly ten seconds.
pub fn profile(kind: AnalysisKind) -> AnalysisProfile {
    match kind {
        AnalysisKind::Market => AnalysisProfile {
            kind,
            template: MARKET_TEMPLATE,
            sections: MARKET_SECTIONS,
            default_provider: Provider::Claude,
            max_tokens: 1000,
            temperature: 0.3,
            word_limit: 400,
        },
        AnalysisKind::Vendor => AnalysisProfile {
            kind,
            template: VENDOR_TEMPLATE,
            sections: VENDOR_SECTIONS,
            default_provider: Provider::OpenAi,
            max_tokens: 1000,
            temperature: 0.4,
            word_limit: 400,
        },
        AnalysisKind::Maturity => AnalysisProfile {
            kind,
            template: MATURITY_TEMPLATE,
            sections: MATURITY_SECTIONS,
            default_provider: Provider::Claude,
            max_tokens: 900,
            temperature: 0.3,
            word_limit: 350,
        },
        AnalysisKind::Forecast => AnalysisProfile {
            kind,
            template: FORECAST_TEMPLATE,
            sections: FORECAST_SECTIONS,
            default_provider: Provider::Claude,
            max_tokens: 900,
            temperature: 0.5,
            word_limit: 350,
        },
        AnalysisKind::Quadrant => AnalysisProfile {
            kind,
            template: QUADRANT_TEMPLATE,
            sections: QUADRANT_SECTIONS,
            default_provider: Provider::Gemini,
            max_tokens: 2000,
            temperature: 0.2,
            word_limit: 900,
        },
    }
}

impl AnalysisProfile {
    /// Renders the prompt for `technology`. Deterministic for the same inputs.
    ///
    /// `vendor` only changes the vendor template; other kinds ignore it.
    pub fn build_prompt(&self, technology: &str, vendor: Option<&str>) -> String {
        let sections = self
            .sections
            .iter()
            .map(|s| format!("**{s}**"))
            .collect::<Vec<_>>()
            .join("\n");

        let vendor_focus = match (self.kind, vendor.map(str::trim)) {
            (AnalysisKind::Vendor, Some(v)) if !v.is_empty() => {
                VENDOR_FOCUS_TEMPLATE.replace("{vendor}", v)
            }
            _ => String::new(),
        };

        let factor_lines = FACTORS
            .iter()
            .map(|f| format!("{}: <0-10>", f.label.to_uppercase()))
            .collect::<Vec<_>>()
            .join("\n");

        let word_ceiling = word_ceiling(self.word_limit);

        // One pass over the template: substituted text is never re-scanned,
        // so braces in a technology or vendor name come through verbatim.
        PLACEHOLDER_RE
            .replace_all(self.template, |caps: &Captures| match &caps[1] {
                "sections" => sections.clone(),
                "factor_lines" => factor_lines.clone(),
                "word_ceiling" => word_ceiling.clone(),
                "vendor_focus" => vendor_focus.clone(),
                "technology" => technology.trim().to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}
