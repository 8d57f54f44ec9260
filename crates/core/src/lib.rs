//! Core library for tocfmt
//!
//! This crate implements the **Functional Core** of the tocfmt application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The tocfmt project splits its logic across three crates:
//!
//! - **`tocfmt_core`** (this crate): Line classification, extraction, indentation and
//!   formatting decisions with zero I/O
//! - **`docx`**: The Word container (zip + XML) and its paragraph model
//! - **`tocfmt`**: The command line shell that opens, processes and saves documents
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O; documents are only reached through [`pass::ParagraphModel`]
//! - **Deterministic**: Paragraphs are processed in order, one at a time
//! - **Testable**: Everything is exercised with fixture strings and in-memory paragraphs
//!
//! # Pipeline
//!
//! For each paragraph:
//!
//! 1. `classify`: is this a TOC entry, an abbreviation definition, or neither?
//! 2. `extract`: split it into title/page or acronym/definition
//! 3. `indent`: infer the nesting level of TOC entries
//! 4. `format`: build the text and tab-stop directive
//! 5. `pass`: apply the directive, falling back to plain text on failure
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use tocfmt_core::extract::{extract, ExtractedEntry};
//!
//! let entry = extract("Introduction……………………5");
//! assert_eq!(
//!     entry,
//!     ExtractedEntry::TocEntry {
//!         title: "Introduction".to_string(),
//!         page: "5".to_string(),
//!     }
//! );
//! ```

pub mod classify;
pub mod extract;
pub mod format;
pub mod indent;
pub mod pass;
pub mod paths;
pub mod token;

pub use classify::{classify, ClassificationResult};
pub use extract::{extract, ExtractedEntry};
pub use format::{
    FormattingDirective, InvalidLayout, LayoutConfig, TabAlignment, TabLeader, TabStop,
};
pub use indent::{resolve_indent, IndentLevel, RawLine, StructuralHints};
pub use pass::{
    inspect_line, process_paragraph, run_pass, EntryKind, EntryOutcome, LineInspection,
    ParagraphModel, PassReport,
};
