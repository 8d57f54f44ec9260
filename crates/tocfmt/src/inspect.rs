use crate::prelude::{println, *};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::document::{display_name, open_document};
use crate::format::preview;
use crate::layout::LayoutArgs;
use tocfmt_core::{
    inspect_line, ClassificationResult, ExtractedEntry, LineInspection, ParagraphModel,
};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct InspectOptions {
    /// Word document to inspect
    input: PathBuf,

    /// Include paragraphs that are not entries
    #[arg(long)]
    all: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    layout: LayoutArgs,
}

#[derive(Debug, Serialize)]
pub struct InspectedParagraph {
    pub index: usize,
    #[serde(flatten)]
    pub inspection: LineInspection,
}

pub fn run(options: InspectOptions) -> Result<()> {
    let config = options.layout.to_config()?;
    let document = open_document(&options.input)?;

    let paragraphs: Vec<InspectedParagraph> = document
        .paragraphs()
        .iter()
        .enumerate()
        .map(|(index, paragraph)| InspectedParagraph {
            index,
            inspection: inspect_line(&paragraph.text(), paragraph.left_indent(), &config),
        })
        .filter(|p| options.all || p.inspection.classification.is_entry())
        .collect();

    if options.json {
        let json = serde_json::to_string_pretty(&paragraphs)?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "{} ({} paragraphs)",
        display_name(&options.input).cyan().bold(),
        document.paragraphs().len()
    );
    for paragraph in &paragraphs {
        let line = describe_inspection(paragraph);
        match paragraph.inspection.classification {
            ClassificationResult::NotAnEntry => println!("{}", line.dimmed()),
            _ => println!("{}", line),
        }
    }

    Ok(())
}

fn classification_label(classification: ClassificationResult) -> &'static str {
    match classification {
        ClassificationResult::NotAnEntry => "text",
        ClassificationResult::TocCandidate => "toc",
        ClassificationResult::AbbreviationCandidate => "abbreviation",
    }
}

/// `[index] classification level  components`
fn describe_inspection(paragraph: &InspectedParagraph) -> String {
    let inspection = &paragraph.inspection;
    let level = inspection
        .level
        .map(|l| format!("level {l}"))
        .unwrap_or_default();

    let details = match &inspection.entry {
        Some(ExtractedEntry::TocEntry { title, page }) => format!("{title} -> {page}"),
        Some(ExtractedEntry::AbbreviationEntry {
            acronym,
            definition,
        }) => format!("{acronym}: {definition}"),
        Some(ExtractedEntry::Unresolved { text }) => format!("{text} (header)"),
        None => preview(&inspection.line.text, 60).to_string(),
    };

    format!(
        "[{:>4}] {:<12} {:<7}  {details}",
        paragraph.index,
        classification_label(inspection.classification),
        level
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tocfmt_core::LayoutConfig;

    fn inspected(index: usize, text: &str, left_indent: Option<f64>) -> InspectedParagraph {
        InspectedParagraph {
            index,
            inspection: inspect_line(text, left_indent, &LayoutConfig::default()),
        }
    }

    #[test]
    fn test_describe_toc_line() {
        let line = describe_inspection(&inspected(3, "\tBackground .... iii", None));
        assert_eq!(line, "[   3] toc          level 1  Background -> iii");
    }

    #[test]
    fn test_describe_abbreviation_line() {
        let paragraph = inspected(12, "DNA: ..... Deoxyribonucleic acid", None);
        let line = describe_inspection(&paragraph);
        assert_eq!(line, "[  12] abbreviation          DNA: Deoxyribonucleic acid");
    }

    #[test]
    fn test_describe_plain_text() {
        let line = describe_inspection(&inspected(0, "Acknowledgements go here.", None));
        assert_eq!(line, "[   0] text                  Acknowledgements go here.");
    }

    #[test]
    fn test_json_carries_index_and_classification() {
        let paragraph = inspected(7, "Methods ........ 12", Some(0.5));
        let json = serde_json::to_string(&paragraph).unwrap();
        assert!(json.contains("\"index\":7"));
        assert!(json.contains("\"classification\":\"toc_candidate\""));
        assert!(json.contains("\"level\":0"));
    }
}
