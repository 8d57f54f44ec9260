use std::path::Path;

use crate::prelude::*;
use docx::Document;
use tocfmt_core::paths::is_docx;

/// Check that `path` names an existing `.docx` file, then open it.
pub fn open_document(path: &Path) -> Result<Document> {
    check_input(path)?;
    log::debug!("Opening {}", path.display());
    Document::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))
}

fn check_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()).into());
    }
    if !is_docx(path) {
        return Err(Error::NotDocx(path.display().to_string()).into());
    }
    Ok(())
}

/// File name for progress output, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
