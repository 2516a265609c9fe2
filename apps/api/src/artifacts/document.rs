//! Paginated report layout.
//!
//! Lines are placed on a fixed grid (`PageSetup::lines_per_page`). Headings are
//! kept with the line that follows them, and blank gaps are dropped at the top
//! of a page.

use serde::Serialize;

use crate::analysis::metrics::Highlights;
use crate::artifacts::font_metrics::{get_metrics, PageSetup, ReportFont};
use crate::artifacts::ModuleDigest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    Title,
    Subtitle,
    Heading,
    Subheading,
    Body,
}

impl LineStyle {
    fn font(self) -> ReportFont {
        match self {
            LineStyle::Title | LineStyle::Heading | LineStyle::Subheading => {
                ReportFont::HelveticaBold
            }
            LineStyle::Subtitle | LineStyle::Body => ReportFont::Helvetica,
        }
    }

    fn keep_with_next(self) -> bool {
        matches!(self, LineStyle::Heading | LineStyle::Subheading)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutLine {
    pub style: LineStyle,
    pub font: ReportFont,
    pub text: String,
    /// Baseline position from the top edge of the page.
    pub y_pt: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub number: usize,
    pub lines: Vec<LaidOutLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLayout {
    pub setup: PageSetup,
    pub pages: Vec<Page>,
    pub line_count: usize,
}

/// A line before pagination; `None` is a blank gap.
type Flow = Vec<Option<(LineStyle, String)>>;

pub fn layout_report(
    technology: &str,
    generated: &str,
    modules: &[ModuleDigest],
    setup: &PageSetup,
) -> ReportLayout {
    let mut flow: Flow = Vec::new();
    push_wrapped(&mut flow, LineStyle::Title, &format!("{technology} Technology Analysis"), setup);
    push_wrapped(&mut flow, LineStyle::Subtitle, &format!("Generated {generated}"), setup);

    for module in modules {
        flow.push(None);
        push_wrapped(&mut flow, LineStyle::Heading, &module_heading(module), setup);
        if let Some(figures) = key_figures(&module.highlights) {
            push_wrapped(&mut flow, LineStyle::Body, &figures, setup);
        }

        let mut wrote_any = false;
        for section in module.extraction.sections.iter().filter(|s| !s.content.trim().is_empty()) {
            if wrote_any {
                flow.push(None);
            }
            push_wrapped(&mut flow, LineStyle::Subheading, &section.title, setup);
            for paragraph in paragraphs(&section.content) {
                push_wrapped(&mut flow, LineStyle::Body, &paragraph, setup);
            }
            wrote_any = true;
        }
        if !wrote_any {
            push_wrapped(&mut flow, LineStyle::Body, "No content was returned for this module.", setup);
        }
    }

    paginate(flow, setup)
}

fn module_heading(module: &ModuleDigest) -> String {
    let kind = module.kind.as_str();
    let mut chars = kind.chars();
    let title: String = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    format!("{title} Analysis")
}

/// One-line summary of the numbers pulled out of a module, if any.
fn key_figures(highlights: &Highlights) -> Option<String> {
    let mut parts = Vec::new();
    match highlights {
        Highlights::Market {
            market_size_usd_billions,
            cagr_percent,
            ..
        } => {
            if let Some(size) = market_size_usd_billions {
                parts.push(format!("Market size: USD {size} bn"));
            }
            if let Some(cagr) = cagr_percent {
                parts.push(format!("CAGR: {cagr}%"));
            }
        }
        Highlights::Vendor { vendors } if !vendors.is_empty() => {
            parts.push(format!("Vendors named: {}", vendors.join(", ")));
        }
        Highlights::Maturity {
            maturity_score,
            hype_cycle_phase,
        } => {
            if let Some(score) = maturity_score {
                parts.push(format!("Maturity: {score}/10"));
            }
            if let Some(phase) = hype_cycle_phase {
                parts.push(format!("Hype cycle: {}", phase.label()));
            }
        }
        Highlights::Forecast { adoption } => {
            parts.extend(adoption.iter().map(|p| format!("{}: {}%", p.year, p.percent)));
        }
        Highlights::Quadrant(parse) => {
            parts.extend(
                parse
                    .vendors
                    .iter()
                    .map(|v| format!("{} ({})", v.name, v.quadrant.label())),
            );
        }
        Highlights::Vendor { .. } => {}
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Splits section content into display paragraphs with markdown emphasis removed.
fn paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().replace("**", ""))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_prefix("* ").or_else(|| line.strip_prefix("• ")) {
            Some(rest) => format!("- {rest}"),
            None => line,
        })
        .collect()
}

fn push_wrapped(flow: &mut Flow, style: LineStyle, text: &str, setup: &PageSetup) {
    for line in get_metrics(style.font()).wrap(text, setup.text_width_em) {
        flow.push(Some((style, line)));
    }
}

fn paginate(flow: Flow, setup: &PageSetup) -> ReportLayout {
    let per_page = setup.lines_per_page.max(2);
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<LaidOutLine> = Vec::new();
    let mut slot = 0usize;
    let mut line_count = 0usize;

    for (i, entry) in flow.iter().enumerate() {
        let Some((style, text)) = entry else {
            if slot > 0 {
                slot += 1;
            }
            if slot >= per_page {
                flush_page(&mut pages, &mut current);
                slot = 0;
            }
            continue;
        };

        let needs = lines_kept_together(&flow[i..]).min(per_page);
        if slot + needs > per_page {
            flush_page(&mut pages, &mut current);
            slot = 0;
        }

        current.push(LaidOutLine {
            style: *style,
            font: style.font(),
            text: text.clone(),
            y_pt: setup.margin_pt + (slot + 1) as f32 * setup.line_height_pt,
        });
        slot += 1;
        line_count += 1;
    }
    flush_page(&mut pages, &mut current);

    ReportLayout {
        setup: setup.clone(),
        pages,
        line_count,
    }
}

/// Number of lines from the start of `rest` that must share a page: a run of
/// headings plus the first line after them.
fn lines_kept_together(rest: &[Option<(LineStyle, String)>]) -> usize {
    let mut needs = 0;
    for entry in rest {
        match entry {
            Some((style, _)) if style.keep_with_next() => needs += 1,
            Some(_) => return needs + 1,
            None => break,
        }
    }
    needs.max(1)
}

fn flush_page(pages: &mut Vec<Page>, current: &mut Vec<LaidOutLine>) {
    if current.is_empty() {
        return;
    }
    pages.push(Page {
        number: pages.len() + 1,
        lines: std::mem::take(current),
    });
}
