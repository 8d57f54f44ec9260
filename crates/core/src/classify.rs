use serde::{Deserialize, Serialize};

use crate::token::{char_len, is_dot_leader, split_trailing_locator, trim_leaders};

/// Lines shorter than this (after trimming) are never entries.
pub const MIN_ENTRY_CHARS: usize = 5;

/// Minimum title length left over once the locator and leaders are removed.
const MIN_TITLE_CHARS: usize = 3;

const ACRONYM_CHARS: std::ops::RangeInclusive<usize> = 2..=15;

/// Outcome of the classification gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationResult {
    NotAnEntry,
    AbbreviationCandidate,
    TocCandidate,
}

impl ClassificationResult {
    pub fn is_entry(&self) -> bool {
        !matches!(self, ClassificationResult::NotAnEntry)
    }
}

/// Decide whether a paragraph's text is worth rewriting.
///
/// The abbreviation shape is tested first, so a line such as `"API: ...... 12"` is an
/// abbreviation even though it also ends in a page number.
pub fn classify(text: &str) -> ClassificationResult {
    let text = text.trim();
    if char_len(text) < MIN_ENTRY_CHARS {
        return ClassificationResult::NotAnEntry;
    }

    if is_abbreviation_definition(text) {
        return ClassificationResult::AbbreviationCandidate;
    }

    match split_trailing_locator(text) {
        Some((head, _)) if char_len(trim_leaders(head)) >= MIN_TITLE_CHARS => {
            ClassificationResult::TocCandidate
        }
        _ => ClassificationResult::NotAnEntry,
    }
}

/// Split an abbreviation line into trimmed `(acronym, definition)` parts.
///
/// This is the single predicate used by both [`classify`] and
/// [`extract`](crate::extract::extract). The definition still carries its leader dots;
/// their presence is what marks the line as needing cleanup.
pub fn split_abbreviation(text: &str) -> Option<(&str, &str)> {
    let (acronym, definition) = text.split_once(':')?;
    let acronym = acronym.trim();
    let definition = definition.trim();

    if !ACRONYM_CHARS.contains(&char_len(acronym)) {
        return None;
    }
    if !acronym.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }
    if !acronym.chars().all(is_acronym_char) {
        return None;
    }
    if !definition.chars().any(is_dot_leader) {
        return None;
    }

    Some((acronym, definition))
}

pub fn is_abbreviation_definition(text: &str) -> bool {
    split_abbreviation(text).is_some()
}

/// ASCII alphanumerics, hyphen and `β` (for names such as "β-strand").
fn is_acronym_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '\u{3B2}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_short_lines_are_rejected() {
        assert_eq!(classify(""), ClassificationResult::NotAnEntry);
        assert_eq!(classify("    "), ClassificationResult::NotAnEntry);
        assert_eq!(classify("xyz"), ClassificationResult::NotAnEntry);
        assert_eq!(classify("  ab 1  "), ClassificationResult::NotAnEntry);
    }

    #[test]
    fn test_toc_line_with_dot_leaders() {
        assert_eq!(
            classify("Introduction……………………5"),
            ClassificationResult::TocCandidate
        );
        assert_eq!(
            classify("   → → Background .... iii"),
            ClassificationResult::TocCandidate
        );
    }

    #[test]
    fn test_toc_line_with_spaces_only() {
        assert_eq!(
            classify("Literature Review   12"),
            ClassificationResult::TocCandidate
        );
    }

    #[test]
    fn test_abbreviation_takes_priority() {
        assert_eq!(
            classify("API: ...... 12"),
            ClassificationResult::AbbreviationCandidate
        );
    }

    #[test]
    fn test_abbreviation_variants() {
        assert_eq!(
            classify("MRI: ....... Magnetic Resonance Imaging"),
            ClassificationResult::AbbreviationCandidate
        );
        assert_eq!(
            classify("β-CTF: … C-terminal fragment"),
            ClassificationResult::AbbreviationCandidate
        );
    }

    #[test]
    fn test_abbreviation_without_dots_is_not_a_candidate() {
        // Already clean: nothing to fix, and no trailing locator either.
        assert_eq!(
            classify("MRI:\tMagnetic Resonance Imaging"),
            ClassificationResult::NotAnEntry
        );
    }

    #[test]
    fn test_acronym_with_space_falls_through_to_toc() {
        assert_eq!(
            classify("CHAPTER 3: Methods ... 45"),
            ClassificationResult::TocCandidate
        );
    }

    #[test]
    fn test_no_trailing_locator() {
        assert_eq!(
            classify("Table 3 Results Summary"),
            ClassificationResult::NotAnEntry
        );
        assert_eq!(classify("A plain paragraph."), ClassificationResult::NotAnEntry);
    }

    #[test]
    fn test_title_too_short_after_stripping() {
        assert_eq!(classify("ab ........ 12"), ClassificationResult::NotAnEntry);
        assert_eq!(classify("→ → ...... 7"), ClassificationResult::NotAnEntry);
    }

    #[test]
    fn test_split_abbreviation_rules() {
        assert_eq!(
            split_abbreviation("DNA: ... Deoxyribonucleic acid"),
            Some(("DNA", "... Deoxyribonucleic acid"))
        );
        // Single character acronym.
        assert_eq!(split_abbreviation("A: ... thing"), None);
        // Too long.
        assert_eq!(split_abbreviation("ABCDEFGHIJKLMNOP: ... thing"), None);
        // Must start with a letter.
        assert_eq!(split_abbreviation("3D: ... three dimensional"), None);
        // Disallowed character.
        assert_eq!(split_abbreviation("A_B: ... thing"), None);
        // No colon.
        assert_eq!(split_abbreviation("DNA ... thing"), None);
    }

    #[test]
    fn test_split_abbreviation_uses_first_colon() {
        assert_eq!(
            split_abbreviation("UTC: ... 12:00 reference time"),
            Some(("UTC", "... 12:00 reference time"))
        );
    }
}
