use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::document::{display_name, open_document};
use crate::layout::LayoutArgs;
use tocfmt_core::paths::{backup_path, default_output_path};
use tocfmt_core::{run_pass, EntryKind, EntryOutcome, PassReport};

const TITLE_PREVIEW_CHARS: usize = 40;
const HEADER_PREVIEW_CHARS: usize = 60;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct FormatOptions {
    /// Word document to format
    input: PathBuf,

    /// Output file (default: <input>_formatted.docx)
    #[arg(short, long, env = "TOCFMT_OUTPUT")]
    output: Option<PathBuf>,

    /// Copy the input to <input>_backup.docx first
    #[arg(long)]
    backup: bool,

    /// Output the pass report as JSON
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    layout: LayoutArgs,
}

pub fn run(options: FormatOptions) -> Result<()> {
    let config = options.layout.to_config()?;
    let mut document = open_document(&options.input)?;

    if options.backup {
        create_backup(&options.input);
    }

    if !options.json {
        println!("Processing: {}", display_name(&options.input).cyan());
    }

    let report = run_pass(document.paragraphs_mut(), &config);
    log::debug!(
        "Pass finished: {} formatted, {} headers, {} degraded, {} skipped",
        report.formatted,
        report.headers,
        report.degraded,
        report.skipped
    );

    if options.json {
        output_json(&report)?;
    } else {
        output_formatted(&report);
    }

    let count = report.processed();
    if count == 0 {
        eprintln!("\n{}", "WARNING: No entries detected".yellow().bold());
        return Ok(());
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.input));
    document
        .save(&output)
        .wrap_err_with(|| format!("Failed to save {}", output.display()))?;

    if !options.json {
        println!("Saved: {}", output.display());
        println!(
            "\n{}",
            format!("SUCCESS: Successfully formatted {count} entries")
                .green()
                .bold()
        );
        println!("Output: {}", output.display().to_string().cyan());
    }

    Ok(())
}

/// A failed backup never stops the run.
fn create_backup(input: &Path) {
    let backup = backup_path(input);
    match std::fs::copy(input, &backup) {
        Ok(_) => eprintln!("Backup created: {}", backup.display()),
        Err(err) => {
            log::warn!("Backup of {} failed: {err}", input.display());
            eprintln!(
                "{}",
                format!("Warning: Could not create backup: {err}").yellow()
            );
        }
    }
}

fn output_json(report: &PassReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn output_formatted(report: &PassReport) {
    for outcome in &report.entries {
        match outcome {
            EntryOutcome::Degraded { reason, .. } => {
                log::warn!("Formatting fell back to plain text: {reason}");
                eprintln!("  {}", describe_outcome(outcome).yellow());
            }
            _ => println!("  {}", describe_outcome(outcome)),
        }
    }
    println!("\nFormatted {} entries", report.processed());
}

/// One progress line per rewritten paragraph.
fn describe_outcome(outcome: &EntryOutcome) -> String {
    match outcome {
        EntryOutcome::Formatted {
            kind: EntryKind::Abbreviation,
            label,
            value,
            ..
        } => format!(
            "Formatted: {label}: {} (abbreviation)",
            preview(value, TITLE_PREVIEW_CHARS)
        ),
        EntryOutcome::Formatted {
            kind: EntryKind::Toc,
            label,
            value,
            level,
        } => {
            let level = level.map(|l| l.as_u8()).unwrap_or_default();
            format!(
                "Formatted: {}{} -> {value} (level {level})",
                "  ".repeat(level as usize),
                preview(label, TITLE_PREVIEW_CHARS)
            )
        }
        EntryOutcome::Header { title } => {
            format!(
                "Formatted: {} (header)",
                preview(title, HEADER_PREVIEW_CHARS)
            )
        }
        EntryOutcome::Degraded { reason, .. } => {
            format!("Warning: Could not format paragraph: {reason}")
        }
        EntryOutcome::Skipped { text } => {
            format!("Skipped: {}", preview(text, HEADER_PREVIEW_CHARS))
        }
    }
}

/// First `max` characters of `text`.
pub fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
