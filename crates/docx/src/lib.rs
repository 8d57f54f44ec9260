//! Word (`.docx`) documents as a list of editable body paragraphs.
//!
//! Only `word/document.xml` is parsed. Every other part of the package is carried through
//! untouched, and so is every paragraph that was never edited.
//!
//! ```rust,ignore
//! use docx::Document;
//! use tocfmt_core::{run_pass, LayoutConfig};
//!
//! let mut document = Document::open("thesis.docx")?;
//! let report = run_pass(document.paragraphs_mut(), &LayoutConfig::default());
//! document.save("thesis_formatted.docx")?;
//! ```

mod package;
mod paragraph;
mod xml;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::package::Package;

pub use paragraph::{Paragraph, MAX_LENGTH_INCHES};

/// Package path of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid .docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Missing document part: {0}")]
    MissingPart(String),

    #[error("{attribute} out of range: {value}")]
    InvalidMeasurement { attribute: &'static str, value: f64 },
}

impl DocxError {
    fn xml(err: impl std::fmt::Display) -> Self {
        DocxError::Xml {
            part: DOCUMENT_PART.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocxError>;

/// The document part as pass-through events with body paragraphs cut out.
#[derive(Debug, Clone)]
enum Node {
    Event(Event<'static>),
    Paragraph(usize),
}

#[derive(Debug, Clone)]
pub struct Document {
    package: Package,
    nodes: Vec<Node>,
    paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let package = Package::read(reader)?;
        let bytes = package
            .get(DOCUMENT_PART)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
        let xml = std::str::from_utf8(bytes).map_err(DocxError::xml)?;

        let (nodes, paragraphs) = parse_document(xml)?;
        log::debug!("Parsed {} body paragraphs", paragraphs.len());

        Ok(Document {
            nodes,
            paragraphs,
            package,
        })
    }

    /// Paragraphs that are direct children of `w:body`, in document order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    /// Serialize the document part with all buffered edits applied.
    pub fn document_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            match node {
                Node::Event(event) => writer.write_event(event).map_err(DocxError::xml)?,
                Node::Paragraph(index) => self.paragraphs[*index]
                    .write_to(&mut writer)
                    .map_err(DocxError::xml)?,
            }
        }
        Ok(writer.into_inner())
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let xml = self.document_xml()?;
        self.package.write(writer, DOCUMENT_PART, &xml)
    }

    /// Write the whole package to `path`. The file is only replaced once the archive is
    /// complete in memory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let buffer = self.write_to(Cursor::new(Vec::new()))?.into_inner();
        std::fs::write(path.as_ref(), buffer)?;
        log::debug!("Saved {}", path.as_ref().display());
        Ok(())
    }
}

/// What to do with one event of the document part.
enum Step {
    Pass,
    OpenParagraph,
    EmptyParagraph,
    CloseParagraph,
    Eof,
}

fn is_body_paragraph(name: &[u8], path: &[Vec<u8>]) -> bool {
    name == b"w:p" && path.last().is_some_and(|parent| parent.as_slice() == b"w:body")
}

/// Split the document part into pass-through events and body-level paragraphs.
fn parse_document(xml: &str) -> Result<(Vec<Node>, Vec<Paragraph>)> {
    let mut reader = Reader::from_str(xml);
    // Whitespace inside w:t is content.
    reader.trim_text(false);

    let mut nodes = Vec::new();
    let mut paragraphs = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut captured: Option<Vec<Event<'static>>> = None;
    let mut captured_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(DocxError::xml)?.into_owned();

        let step = match &event {
            Event::Eof => Step::Eof,
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                let opens = captured.is_none() && is_body_paragraph(&name, &path);
                path.push(name);
                if opens {
                    captured_depth = path.len();
                    Step::OpenParagraph
                } else {
                    Step::Pass
                }
            }
            Event::Empty(e)
                if captured.is_none() && is_body_paragraph(e.name().as_ref(), &path) =>
            {
                Step::EmptyParagraph
            }
            Event::End(_) => {
                let closes = captured.is_some() && path.len() == captured_depth;
                path.pop();
                if closes {
                    Step::CloseParagraph
                } else {
                    Step::Pass
                }
            }
            _ => Step::Pass,
        };

        match step {
            Step::Eof => break,
            Step::OpenParagraph => captured = Some(vec![event]),
            Step::EmptyParagraph => {
                nodes.push(Node::Paragraph(paragraphs.len()));
                paragraphs.push(Paragraph::from_events(vec![event]));
            }
            Step::CloseParagraph => {
                if let Some(mut events) = captured.take() {
                    events.push(event);
                    nodes.push(Node::Paragraph(paragraphs.len()));
                    paragraphs.push(Paragraph::from_events(events));
                }
            }
            Step::Pass => match captured.as_mut() {
                Some(events) => events.push(event),
                None => nodes.push(Node::Event(event)),
            },
        }
    }

    if captured.is_some() {
        return Err(DocxError::xml("unterminated paragraph"));
    }

    Ok((nodes, paragraphs))
}
