use std::path::{Path, PathBuf};

/// Whether the path names a Word document (`.docx`, any case).
pub fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

/// Sibling path with `suffix` appended to the file stem: `report.docx` -> `report_formatted.docx`.
pub fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(file_name)
}

/// Output path used when none is given.
pub fn default_output_path(input: &Path) -> PathBuf {
    with_stem_suffix(input, "formatted")
}

pub fn backup_path(input: &Path) -> PathBuf {
    with_stem_suffix(input, "backup")
}
