use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::split_abbreviation;
use crate::token::{
    char_len, is_dot_leader, is_locator_token, trim_trailing_leaders, ARROW, MAX_LOCATOR_CHARS,
};

const MIN_LINE_CHARS: usize = 3;
const MIN_TITLE_CHARS: usize = 2;

/// Semantic parts of a classified line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedEntry {
    AbbreviationEntry { acronym: String, definition: String },
    TocEntry { title: String, page: String },
    /// A title-only (header) line: no page number or definition could be split off.
    Unresolved { text: String },
}

impl ExtractedEntry {
    /// The label and value pair, or `None` for header-only lines.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match self {
            ExtractedEntry::AbbreviationEntry {
                acronym,
                definition,
            } => Some((acronym, definition)),
            ExtractedEntry::TocEntry { title, page } => Some((title, page)),
            ExtractedEntry::Unresolved { .. } => None,
        }
    }
}

/// One title/page splitting strategy: a pattern capturing `(title, page)` and the
/// check a match must pass before it is accepted.
struct SplitRule {
    pattern: &'static str,
    validate: fn(&str, &str) -> Option<(String, String)>,
}

/// Ordered from most to least specific leader evidence; the first rule whose match
/// validates wins.
const SPLIT_RULES: &[SplitRule] = &[
    // Title, two or more dots/ellipses, page.
    SplitRule {
        pattern: r"(?i)^(.+?)[.…]{2,}\s*([ivxlcdm]+|[0-9]+)\s*$",
        validate: validate_toc_parts,
    },
    // Title, three or more mixed dots/ellipses/spaces, page.
    SplitRule {
        pattern: r"(?i)^(.+?)[.…\s]{3,}([ivxlcdm]+|[0-9]+)\s*$",
        validate: validate_toc_parts,
    },
    // Title, a wide gap of plain spaces, page.
    SplitRule {
        pattern: r"(?i)^(.+?)\s{2,}([ivxlcdm]+|[0-9]+)\s*$",
        validate: validate_toc_parts,
    },
    // Title, any whitespace, page.
    SplitRule {
        pattern: r"(?i)^(.+?)\s+([ivxlcdm]+|[0-9]+)\s*$",
        validate: validate_toc_parts,
    },
];

fn compiled_rules() -> &'static [(&'static SplitRule, Regex)] {
    static RULES: OnceLock<Vec<(&'static SplitRule, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        SPLIT_RULES
            .iter()
            .map(|rule| (rule, Regex::new(rule.pattern).unwrap()))
            .collect()
    })
}

/// Shared acceptance test for a `(title, page)` candidate.
fn validate_toc_parts(title: &str, page: &str) -> Option<(String, String)> {
    let title = trim_trailing_leaders(title.trim());
    let page = page.trim();

    if char_len(title) < MIN_TITLE_CHARS {
        return None;
    }
    if char_len(page) > MAX_LOCATOR_CHARS || !is_locator_token(page) {
        return None;
    }

    Some((title.to_string(), page.to_string()))
}

/// Split a line into its label and value.
///
/// Pure: the same input always yields the same entry.
pub fn extract(text: &str) -> ExtractedEntry {
    let text = text.trim();
    if char_len(text) < MIN_LINE_CHARS {
        return ExtractedEntry::Unresolved {
            text: text.to_string(),
        };
    }

    if let Some((acronym, definition)) = split_abbreviation(text) {
        let definition = definition.trim_matches(|c: char| is_dot_leader(c) || c.is_whitespace());
        // Nothing after the leader: keep the acronym as a header title.
        if definition.is_empty() {
            return ExtractedEntry::Unresolved {
                text: acronym.to_string(),
            };
        }
        return ExtractedEntry::AbbreviationEntry {
            acronym: acronym.to_string(),
            definition: definition.to_string(),
        };
    }

    let body = strip_leading_leaders(text);

    split_with_rules(body)
        .or_else(|| split_last_word(body))
        .map(|(title, page)| ExtractedEntry::TocEntry { title, page })
        .unwrap_or_else(|| ExtractedEntry::Unresolved {
            text: body.to_string(),
        })
}

/// Remove arrow indentation, then any dot run left in front of the title.
fn strip_leading_leaders(text: &str) -> &str {
    text.trim_start_matches(|c: char| c == ARROW || c.is_whitespace())
        .trim_start_matches(|c: char| is_dot_leader(c) || c.is_whitespace())
}

fn split_with_rules(body: &str) -> Option<(String, String)> {
    compiled_rules().iter().find_map(|(rule, regex)| {
        let caps = regex.captures(body)?;
        (rule.validate)(&caps[1], &caps[2])
    })
}

/// Last resort: the final whitespace-delimited word is the page.
fn split_last_word(body: &str) -> Option<(String, String)> {
    let words: Vec<&str> = body.split_whitespace().collect();
    let (page, rest) = words.split_last()?;

    if char_len(page) > MAX_LOCATOR_CHARS || !is_locator_token(page) {
        return None;
    }

    let title = rest.join(" ");
    let title = trim_trailing_leaders(&title);
    if char_len(title) < MIN_TITLE_CHARS {
        return None;
    }

    Some((title.to_string(), page.to_string()))
}
