//! Section extraction: carves a free-text completion into named sections.
//!
//! A section starts at a bold heading (`**TITLE**`, optionally numbered,
//! optionally behind `#` markers, optionally followed by `:`) or a markdown
//! `#` heading, and runs until the next section heading or the end of text.
//!
//! Best effort only. Every expected key is always present in the result:
//! titles the model skipped come back empty, and when no title matches at all
//! the text is split into equal-length parts and the result is flagged
//! `fallback`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?)?\*\*[ \t]*([^*\n]+?)[ \t]*\*\*[ \t]*:?")
        .unwrap()
});

static MARKDOWN_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+(?:\d+[.)][ \t]*)?([^\n#*]+?)[ \t]*:?[ \t]*$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSection {
    pub title: String,
    /// snake_case form of the title, e.g. `market_size_and_growth`.
    pub key: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    /// One entry per expected title, in the order the titles were given.
    pub sections: Vec<ExtractedSection>,
    /// Number of titles found as headings in the text.
    pub matched: usize,
    /// True when no title matched and the content is a length-based split.
    pub fallback: bool,
}

impl Extraction {
    /// Looks a section up by title or key.
    pub fn get(&self, title_or_key: &str) -> Option<&str> {
        let wanted = normalize(title_or_key);
        self.sections
            .iter()
            .find(|s| s.key == title_or_key || normalize(&s.title) == wanted)
            .map(|s| s.content.as_str())
    }
}

/// A heading candidate found in the text.
#[derive(Debug)]
struct Heading {
    start: usize,
    end: usize,
    normalized: String,
    /// Starts a line and is either all caps or a markdown heading, so it can
    /// end a section even when it is not one of the expected titles.
    standalone: bool,
}

/// Extracts `titles` from `text`. Never fails.
pub fn extract_sections(text: &str, titles: &[&str]) -> Extraction {
    let normalized_titles: Vec<String> = titles.iter().map(|t| normalize(t)).collect();
    let headings = find_headings(text);

    // A heading ends the previous section if it is one of ours or looks like a
    // top-level heading of its own (all caps, at the start of a line).
    let boundaries: Vec<&Heading> = headings
        .iter()
        .filter(|h| {
            normalized_titles.iter().any(|t| title_matches(&h.normalized, t))
                || (h.standalone && looks_like_section_heading(&h.normalized))
        })
        .collect();

    let mut matched = 0;
    let mut sections: Vec<ExtractedSection> = titles
        .iter()
        .zip(&normalized_titles)
        .map(|(title, normalized)| {
            let position = boundaries
                .iter()
                .position(|h| title_matches(&h.normalized, normalized));
            let content = match position {
                Some(i) => {
                    matched += 1;
                    let from = boundaries[i].end;
                    let to = boundaries.get(i + 1).map_or(text.len(), |next| next.start);
                    clean_content(&text[from..to.max(from)])
                }
                None => String::new(),
            };
            ExtractedSection {
                title: title.to_string(),
                key: section_key(title),
                content,
            }
        })
        .collect();

    let fallback = matched == 0 && !titles.is_empty() && !text.trim().is_empty();
    if fallback {
        for (section, part) in sections.iter_mut().zip(split_evenly(text, titles.len())) {
            section.content = part;
        }
    }

    Extraction {
        sections,
        matched,
        fallback,
    }
}

fn find_headings(text: &str) -> Vec<Heading> {
    let mut headings: Vec<Heading> = BOLD_HEADING_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(2)?;
            let at_line_start = caps.get(1).is_some() || is_line_start(text, whole.start());
            Some(Heading {
                start: whole.start(),
                end: whole.end(),
                normalized: normalize(label.as_str()),
                // `**VENDOR:** Acme` and `**IBM**: mainframe` are field
                // labels, not headings
                standalone: at_line_start
                    && is_all_caps(label.as_str())
                    && !label.as_str().ends_with(':')
                    && rest_of_line_is_blank(text, whole.end()),
            })
        })
        .collect();

    for caps in MARKDOWN_HEADING_RE.captures_iter(text) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Bold markdown headings were already picked up above.
        if headings.iter().any(|h| h.start < whole.end() && whole.start() < h.end) {
            continue;
        }
        headings.push(Heading {
            start: whole.start(),
            end: whole.end(),
            normalized: normalize(label.as_str()),
            standalone: true,
        });
    }

    headings.sort_by_key(|h| h.start);
    headings
}

fn is_line_start(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .rev()
        .take_while(|c| *c != '\n')
        .all(|c| c == ' ' || c == '\t')
}

fn rest_of_line_is_blank(text: &str, pos: usize) -> bool {
    text[pos..]
        .chars()
        .take_while(|c| *c != '\n')
        .all(char::is_whitespace)
}

fn is_all_caps(label: &str) -> bool {
    label.chars().any(char::is_alphabetic)
        && label
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// Uppercase, `&` spelled out, punctuation dropped, whitespace collapsed.
fn normalize(s: &str) -> String {
    let spelled = s.to_uppercase().replace('&', " AND ");
    let cleaned: String = spelled
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    // "1 MARKET SIZE" from an unusual numbering style
    let skip = usize::from(words.first().is_some_and(|w| w.chars().all(|c| c.is_ascii_digit())));
    words[skip..].join(" ")
}

fn title_matches(heading: &str, title: &str) -> bool {
    !title.is_empty()
        && (heading == title
            || heading
                .strip_prefix(title)
                .is_some_and(|rest| rest.starts_with(' ')))
}

fn looks_like_section_heading(normalized: &str) -> bool {
    let letters: Vec<char> = normalized.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 3 && normalized.len() <= 60
}

/// `MARKET SIZE & GROWTH` → `market_size_and_growth`.
pub fn section_key(title: &str) -> String {
    normalize(title).to_lowercase().replace(' ', "_")
}

fn clean_content(raw: &str) -> String {
    raw.trim_start_matches([':', ' ', '\t'])
        .trim()
        .trim_end_matches("---")
        .trim_end()
        .to_string()
}

/// Splits `text` into `parts` pieces of roughly equal length, cutting at
/// whitespace. Always returns exactly `parts` strings.
pub fn split_evenly(text: &str, parts: usize) -> Vec<String> {
    if parts == 0 {
        return Vec::new();
    }
    let text = text.trim();
    let target = text.len() / parts;
    let mut pieces = Vec::with_capacity(parts);
    let mut start = 0;

    for i in 1..parts {
        let mut ideal = (target * i).max(start);
        // byte offsets can land inside a multi-byte char
        while !text.is_char_boundary(ideal) {
            ideal += 1;
        }
        let cut = text[ideal..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map_or(text.len(), |(offset, _)| ideal + offset);
        pieces.push(text[start..cut].trim().to_string());
        start = cut;
    }
    pieces.push(text[start..].trim().to_string());
    pieces
}
