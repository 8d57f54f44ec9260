use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::ExtractedEntry;
use crate::indent::IndentLevel;

/// Position of the right-aligned page/definition tab stop, in inches.
pub const TAB_POSITION_INCHES: f64 = 6.5;

/// Left indent added per nesting level, in inches.
pub const INDENT_PER_LEVEL_INCHES: f64 = 0.25;

/// Layout constants applied to every rewritten paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub tab_position: f64,
    pub indent_per_level: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            tab_position: TAB_POSITION_INCHES,
            indent_per_level: INDENT_PER_LEVEL_INCHES,
        }
    }
}

impl LayoutConfig {
    /// Reject values a word processor cannot lay out.
    pub fn validate(&self) -> Result<(), InvalidLayout> {
        if !self.tab_position.is_finite() || self.tab_position < 0.0 {
            return Err(InvalidLayout::TabPosition(self.tab_position));
        }
        if !self.indent_per_level.is_finite() || self.indent_per_level < 0.0 {
            return Err(InvalidLayout::IndentStep(self.indent_per_level));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidLayout {
    #[error("Tab position must be a non-negative number of inches, got {0}")]
    TabPosition(f64),

    #[error("Indent step must be a non-negative number of inches, got {0}")]
    IndentStep(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabAlignment {
    Left,
    Center,
    Right,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabLeader {
    None,
    Dotted,
}

/// A single tab stop as handed to the document model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabStop {
    pub position: f64,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

/// Final text and paragraph formatting for one entry. Lengths are in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingDirective {
    pub text: String,
    pub left_indent: f64,
    pub tab_position: f64,
    pub tab_alignment: TabAlignment,
    pub tab_leader: TabLeader,
    pub line_spacing: f64,
    pub space_before: f64,
    pub space_after: f64,
}

impl FormattingDirective {
    /// The tab stop to install, if any. Header-only lines carry no leader and get none.
    pub fn tab_stop(&self) -> Option<TabStop> {
        match self.tab_leader {
            TabLeader::None => None,
            leader => Some(TabStop {
                position: self.tab_position,
                alignment: self.tab_alignment,
                leader,
            }),
        }
    }
}

/// Build the directive for an extracted entry.
///
/// `level` only affects TOC entries; abbreviations and header-only lines are flush left.
pub fn format(
    entry: &ExtractedEntry,
    level: IndentLevel,
    config: &LayoutConfig,
) -> FormattingDirective {
    let (text, left_indent, tab_leader) = match entry {
        ExtractedEntry::AbbreviationEntry {
            acronym,
            definition,
        } => (format!("{acronym}:\t{definition}"), 0.0, TabLeader::Dotted),
        ExtractedEntry::TocEntry { title, page } => (
            format!("{title}\t{page}"),
            f64::from(level.as_u8()) * config.indent_per_level,
            TabLeader::Dotted,
        ),
        ExtractedEntry::Unresolved { text } => (text.clone(), 0.0, TabLeader::None),
    };

    FormattingDirective {
        text,
        left_indent,
        tab_position: config.tab_position,
        tab_alignment: TabAlignment::Right,
        tab_leader,
        line_spacing: 1.0,
        space_before: 0.0,
        space_after: 0.0,
    }
}

/// Plain-text rendering used when formatting attributes cannot be applied.
pub fn plain_text(entry: &ExtractedEntry) -> String {
    match entry {
        ExtractedEntry::AbbreviationEntry {
            acronym,
            definition,
        } => format!("{acronym}: {definition}"),
        ExtractedEntry::TocEntry { title, page } => format!("{title}\t{page}"),
        ExtractedEntry::Unresolved { text } => text.clone(),
    }
}
