//! One classify, extract, resolve, format and apply step per paragraph.
//!
//! The document itself stays behind [`ParagraphModel`]; this module never touches files.
//! Per-paragraph problems are expressed as [`EntryOutcome`] values so a single bad
//! paragraph can never abort the pass.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, ClassificationResult};
use crate::extract::{extract, ExtractedEntry};
use crate::format::{format, plain_text, FormattingDirective, LayoutConfig, TabStop};
use crate::indent::{resolve_indent, IndentLevel, RawLine};

/// The paragraph operations the pass needs from a host document model.
///
/// Lengths are in inches. Every write may fail; a failure makes the pass discard the
/// paragraph's pending writes and fall back to plain text.
pub trait ParagraphModel {
    type Error: Display;

    fn text(&self) -> String;
    fn left_indent(&self) -> Option<f64>;

    /// Drop every write since the paragraph was read.
    fn discard_edits(&mut self);

    fn set_text(&mut self, text: &str) -> Result<(), Self::Error>;
    fn clear_tab_stops(&mut self) -> Result<(), Self::Error>;
    fn add_tab_stop(&mut self, stop: TabStop) -> Result<(), Self::Error>;
    fn set_left_indent(&mut self, inches: f64) -> Result<(), Self::Error>;
    fn set_first_line_indent(&mut self, inches: f64) -> Result<(), Self::Error>;
    /// Line spacing as a multiple of single spacing.
    fn set_line_spacing(&mut self, multiple: f64) -> Result<(), Self::Error>;
    fn set_space_before(&mut self, inches: f64) -> Result<(), Self::Error>;
    fn set_space_after(&mut self, inches: f64) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Toc,
    Abbreviation,
}

/// What happened to one paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Not an entry; the paragraph was left untouched.
    Skipped { text: String },
    Formatted {
        kind: EntryKind,
        label: String,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        level: Option<IndentLevel>,
    },
    /// Title-only line, rewritten flush left without a leader.
    Header { title: String },
    /// Formatting could not be applied. Writes made before the failure were discarded and
    /// `text` is the plain fallback written instead; the paragraph keeps its original
    /// indent, tab stops and spacing.
    Degraded { text: String, reason: String },
}

/// Running totals for a pass, returned instead of kept in global state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub formatted: usize,
    pub headers: usize,
    pub skipped: usize,
    pub degraded: usize,
    /// Every non-skipped outcome in document order.
    pub entries: Vec<EntryOutcome>,
}

impl PassReport {
    pub fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Skipped { .. } => {
                self.skipped += 1;
                return;
            }
            EntryOutcome::Formatted { .. } => self.formatted += 1,
            EntryOutcome::Header { .. } => self.headers += 1,
            EntryOutcome::Degraded { .. } => self.degraded += 1,
        }
        self.entries.push(outcome);
    }

    /// Paragraphs that were rewritten in any form.
    pub fn processed(&self) -> usize {
        self.formatted + self.headers + self.degraded
    }
}

/// Read-only view of how a single line would be handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInspection {
    pub line: RawLine,
    pub classification: ClassificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<ExtractedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<IndentLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<FormattingDirective>,
}

/// Run the whole decision chain for one line without touching any document.
pub fn inspect_line(
    raw_text: &str,
    left_indent: Option<f64>,
    config: &LayoutConfig,
) -> LineInspection {
    let line = RawLine::new(raw_text, left_indent);
    let classification = classify(&line.text);

    if !classification.is_entry() {
        return LineInspection {
            line,
            classification,
            entry: None,
            level: None,
            directive: None,
        };
    }

    let entry = extract(&line.text);
    let level = entry_level(&entry, &line);
    let directive = format(&entry, level.unwrap_or_default(), config);

    LineInspection {
        line,
        classification,
        entry: Some(entry),
        level,
        directive: Some(directive),
    }
}

/// Only TOC entries carry a nesting level.
fn entry_level(entry: &ExtractedEntry, line: &RawLine) -> Option<IndentLevel> {
    match entry {
        ExtractedEntry::TocEntry { .. } => Some(resolve_indent(&line.hints, &line.text)),
        _ => None,
    }
}

/// Apply every attribute of a directive, stopping at the first refusal.
pub fn apply_directive<P: ParagraphModel>(
    paragraph: &mut P,
    directive: &FormattingDirective,
) -> Result<(), P::Error> {
    paragraph.set_text(&directive.text)?;
    paragraph.set_left_indent(directive.left_indent)?;
    paragraph.set_first_line_indent(0.0)?;
    paragraph.clear_tab_stops()?;
    if let Some(stop) = directive.tab_stop() {
        paragraph.add_tab_stop(stop)?;
    }
    paragraph.set_line_spacing(directive.line_spacing)?;
    paragraph.set_space_after(directive.space_after)?;
    paragraph.set_space_before(directive.space_before)?;
    Ok(())
}

/// Classify, extract, format and apply one paragraph.
pub fn process_paragraph<P: ParagraphModel>(
    paragraph: &mut P,
    config: &LayoutConfig,
) -> EntryOutcome {
    let inspection = inspect_line(&paragraph.text(), paragraph.left_indent(), config);

    let (Some(entry), Some(directive)) = (inspection.entry, inspection.directive) else {
        return EntryOutcome::Skipped {
            text: inspection.line.text,
        };
    };

    if let Err(err) = apply_directive(paragraph, &directive) {
        paragraph.discard_edits();
        let text = plain_text(&entry);
        let reason = match paragraph.set_text(&text) {
            Ok(()) => err.to_string(),
            Err(fallback_err) => format!("{err}; plain text fallback failed: {fallback_err}"),
        };
        return EntryOutcome::Degraded { text, reason };
    }

    match entry {
        ExtractedEntry::TocEntry { title, page } => EntryOutcome::Formatted {
            kind: EntryKind::Toc,
            label: title,
            value: page,
            level: inspection.level,
        },
        ExtractedEntry::AbbreviationEntry {
            acronym,
            definition,
        } => EntryOutcome::Formatted {
            kind: EntryKind::Abbreviation,
            label: acronym,
            value: definition,
            level: None,
        },
        ExtractedEntry::Unresolved { text } => EntryOutcome::Header { title: text },
    }
}

/// Process paragraphs strictly in order and fold the outcomes into a report.
pub fn run_pass<'a, P, I>(paragraphs: I, config: &LayoutConfig) -> PassReport
where
    P: ParagraphModel + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    let mut report = PassReport::default();
    for paragraph in paragraphs {
        report.record(process_paragraph(paragraph, config));
    }
    report
}
