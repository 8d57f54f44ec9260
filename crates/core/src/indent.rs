use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::ARROW;

/// Section headers that always sit at the top level, compared against the uppercased
/// line start.
const TOP_LEVEL_KEYWORDS: &[&str] = &[
    "CHAPTER",
    "SECTION",
    "LIST OF",
    "TABLE OF",
    "ACKNOWLEDGEMENTS",
    "ACKNOWLEDGMENTS",
    "REFERENCES",
    "ABSTRACT",
    "INTRODUCTION",
    "METHODS",
    "RESULTS",
    "DISCUSSION",
    "CONCLUSION",
    "CITATION",
    "DEDICATION",
    "SUPPORTING MATERIAL",
    "COMPREHENSIVE",
    "MATHEMATICAL",
];

/// Caption prefixes, matched case-sensitively.
const CAPTION_PREFIXES: &[&str] = &["Table ", "Figure "];

/// Nesting depth of a TOC entry, `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct IndentLevel(u8);

impl IndentLevel {
    pub const TOP: Self = IndentLevel(0);
    pub const MAX: Self = IndentLevel(3);

    /// Clamp an arbitrary count into the valid range.
    pub fn saturating(count: usize) -> Self {
        IndentLevel(count.min(Self::MAX.0 as usize) as u8)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for IndentLevel {
    type Error = InvalidIndentLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX.0 {
            Ok(IndentLevel(value))
        } else {
            Err(InvalidIndentLevel)
        }
    }
}

impl From<IndentLevel> for u8 {
    fn from(level: IndentLevel) -> Self {
        level.0
    }
}

impl fmt::Display for IndentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
#[error("Indent level must be between 0 and 3")]
pub struct InvalidIndentLevel;

/// Indentation evidence gathered from a paragraph before its text is trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralHints {
    /// Paragraph left indent in inches, if the paragraph sets one.
    pub left_indent: Option<f64>,
    pub leading_tabs: usize,
    pub leading_spaces: usize,
    pub leading_arrows: usize,
}

impl StructuralHints {
    /// Count the leading markers of the raw (untrimmed) paragraph text.
    pub fn from_raw(text: &str, left_indent: Option<f64>) -> Self {
        let leading_arrows = text
            .chars()
            .take_while(|&c| c == ARROW || c == ' ' || c == '\t')
            .filter(|&c| c == ARROW)
            .count();
        let leading_tabs = text
            .chars()
            .take_while(|&c| c == '\t' || c == ' ')
            .filter(|&c| c == '\t')
            .count();
        let leading_spaces = text.chars().take_while(|&c| c == ' ').count();

        StructuralHints {
            left_indent,
            leading_tabs,
            leading_spaces,
            leading_arrows,
        }
    }
}

/// A paragraph's trimmed text together with its structural hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,
    pub hints: StructuralHints,
}

impl RawLine {
    pub fn new(raw_text: &str, left_indent: Option<f64>) -> Self {
        RawLine {
            text: raw_text.trim().to_string(),
            hints: StructuralHints::from_raw(raw_text, left_indent),
        }
    }
}

/// Infer the nesting depth of a TOC entry.
///
/// Top-level section keywords and `Table `/`Figure ` captions are always level 0.
/// Otherwise signals are tried in order and the first one that fires wins: paragraph
/// indent, leading arrows, leading tabs, leading spaces.
pub fn resolve_indent(hints: &StructuralHints, text: &str) -> IndentLevel {
    if is_forced_top_level(text) {
        return IndentLevel::TOP;
    }

    structural_level(hints.left_indent)
        .or_else(|| marker_level(hints.leading_arrows))
        .or_else(|| marker_level(hints.leading_tabs))
        .unwrap_or_else(|| spaces_level(hints.leading_spaces))
}

/// One level per leading arrow or tab, capped at the deepest level.
fn marker_level(count: usize) -> Option<IndentLevel> {
    (count > 0).then(|| IndentLevel::saturating(count))
}

fn structural_level(left_indent: Option<f64>) -> Option<IndentLevel> {
    match left_indent {
        Some(inches) if inches >= 1.0 => Some(IndentLevel(2)),
        Some(inches) if inches >= 0.3 => Some(IndentLevel(1)),
        _ => None,
    }
}

fn spaces_level(leading_spaces: usize) -> IndentLevel {
    match leading_spaces {
        n if n >= 8 => IndentLevel(2),
        n if n >= 4 => IndentLevel(1),
        _ => IndentLevel::TOP,
    }
}

fn is_forced_top_level(text: &str) -> bool {
    let stripped = text.trim_start_matches(|c: char| c == ARROW || c.is_whitespace());
    let upper = stripped.to_uppercase();

    TOP_LEVEL_KEYWORDS.iter().any(|kw| upper.starts_with(kw))
        || CAPTION_PREFIXES.iter().any(|p| stripped.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(raw: &str, left_indent: Option<f64>) -> u8 {
        let line = RawLine::new(raw, left_indent);
        resolve_indent(&line.hints, &line.text).as_u8()
    }

    #[test]
    fn test_hints_from_raw_text() {
        let hints = StructuralHints::from_raw("   → → Background .... iii", None);
        assert_eq!(hints.leading_arrows, 2);
        assert_eq!(hints.leading_spaces, 3);
        assert_eq!(hints.leading_tabs, 0);

        let hints = StructuralHints::from_raw("\t \tMethods 4", Some(0.5));
        assert_eq!(hints.leading_tabs, 2);
        assert_eq!(hints.leading_spaces, 0);
        assert_eq!(hints.left_indent, Some(0.5));
    }

    #[test]
    fn test_structural_indent_levels() {
        assert_eq!(level("Background 3", Some(1.0)), 2);
        assert_eq!(level("Background 3", Some(0.5)), 1);
        assert_eq!(level("Background 3", Some(0.3)), 1);
    }

    #[test]
    fn test_small_structural_indent_falls_through() {
        assert_eq!(level("→ Background 3", Some(0.1)), 1);
        assert_eq!(level("Background 3", Some(0.1)), 0);
        assert_eq!(level("\tBackground 3", Some(0.0)), 1);
    }

    #[test]
    fn test_structural_indent_wins_over_arrows() {
        assert_eq!(level("→ → Background 3", Some(1.0)), 2);
        assert_eq!(level("→ → → Background 3", Some(0.5)), 1);
    }

    #[test]
    fn test_arrows() {
        assert_eq!(level("   → → Background .... iii", None), 2);
        assert_eq!(level("→→→→→ Deep 9", None), 3);
    }

    #[test]
    fn test_arrows_win_over_tabs() {
        assert_eq!(level("\t\t→ Background 3", None), 1);
    }

    #[test]
    fn test_tabs() {
        assert_eq!(level("\tBackground 3", None), 1);
        assert_eq!(level("\t\t\t\tBackground 3", None), 3);
    }

    #[test]
    fn test_spaces() {
        assert_eq!(level("   Background 3", None), 0);
        assert_eq!(level("    Background 3", None), 1);
        assert_eq!(level("        Background 3", None), 2);
    }

    #[test]
    fn test_default_level() {
        assert_eq!(level("Background 3", None), 0);
    }

    #[test]
    fn test_header_keyword_override() {
        assert_eq!(level("\t\tCHAPTER 3: Methods ... 45", Some(1.2)), 0);
        assert_eq!(level("→ → Chapter 3: Methods ... 45", None), 0);
        assert_eq!(level("        List of Tables ..... vi", None), 0);
        assert_eq!(level("\tAcknowledgements ..... ii", None), 0);
    }

    #[test]
    fn test_caption_override() {
        assert_eq!(level("\t\tTable 3 Results Summary 12", None), 0);
        assert_eq!(level("    Figure 2.1 Workflow ..... 8", Some(0.5)), 0);
        // Caption prefixes are case sensitive.
        assert_eq!(level("\ttable 3 results 12", None), 1);
    }

    #[test]
    fn test_indent_level_bounds() {
        assert!(IndentLevel::try_from(3).is_ok());
        assert!(IndentLevel::try_from(4).is_err());
        assert_eq!(IndentLevel::saturating(7), IndentLevel::MAX);
    }

    #[test]
    fn test_indent_level_serde() {
        let json = serde_json::to_string(&IndentLevel::saturating(2)).unwrap();
        assert_eq!(json, "2");
        assert!(serde_json::from_str::<IndentLevel>("5").is_err());
    }
}
