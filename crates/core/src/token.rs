//! Character classes shared by the classifier, extractor and indentation resolver.
//!
//! Human-typed TOC lines use three kinds of filler between a title and its page:
//! literal dots, the single-glyph ellipsis (`…`) and right arrows (`→`). The helpers here
//! recognise those fillers and the trailing locator token (page number).

/// Right-arrow glyph typed as a manual indentation or leader marker.
pub const ARROW: char = '\u{2192}';

/// Single-character horizontal ellipsis.
pub const ELLIPSIS: char = '\u{2026}';

/// Longest page locator accepted by the extractor.
pub const MAX_LOCATOR_CHARS: usize = 6;

/// A dot leader character: `.` or `…`.
pub fn is_dot_leader(c: char) -> bool {
    c == '.' || c == ELLIPSIS
}

/// Any filler character: dots, ellipsis, arrows or whitespace.
pub fn is_leader(c: char) -> bool {
    is_dot_leader(c) || c == ARROW || c.is_whitespace()
}

fn is_roman_char(c: char) -> bool {
    matches!(
        c.to_ascii_lowercase(),
        'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm'
    )
}

/// Whether `s` is a page locator: a run of ASCII digits or a case-insensitive
/// Roman-numeral run.
pub fn is_locator_token(s: &str) -> bool {
    !s.is_empty() && (s.chars().all(|c| c.is_ascii_digit()) || s.chars().all(is_roman_char))
}

/// Split a line into `(head, locator)` when it ends with a locator token.
///
/// Trailing whitespace is ignored. A digit run may follow anything; a Roman-numeral run
/// must not be glued to a preceding letter, so "Basic" does not end in the locator "ic".
pub fn split_trailing_locator(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_end();

    let digits_start = trailing_run_start(text, |c| c.is_ascii_digit());
    if digits_start < text.len() {
        return Some((&text[..digits_start], &text[digits_start..]));
    }

    let roman_start = trailing_run_start(text, is_roman_char);
    if roman_start == text.len() {
        return None;
    }
    let glued = text[..roman_start]
        .chars()
        .next_back()
        .is_some_and(char::is_alphabetic);
    if glued {
        return None;
    }

    Some((&text[..roman_start], &text[roman_start..]))
}

/// Byte offset where the trailing run of `pred` characters starts.
fn trailing_run_start(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .rev()
        .take_while(|&(_, c)| pred(c))
        .last()
        .map_or(text.len(), |(idx, _)| idx)
}

/// Trim filler characters from both ends.
pub fn trim_leaders(s: &str) -> &str {
    s.trim_matches(is_leader)
}

/// Trim filler characters from the end only.
pub fn trim_trailing_leaders(s: &str) -> &str {
    s.trim_end_matches(is_leader)
}

/// Number of Unicode scalar values; lengths are measured in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_token_shapes() {
        assert!(is_locator_token("12"));
        assert!(is_locator_token("iii"));
        assert!(is_locator_token("XIV"));
        assert!(!is_locator_token(""));
        assert!(!is_locator_token("12a"));
        assert!(!is_locator_token("iv2"));
    }

    #[test]
    fn test_split_trailing_locator_digits() {
        assert_eq!(
            split_trailing_locator("Introduction....5  "),
            Some(("Introduction....", "5"))
        );
        assert_eq!(split_trailing_locator("Chapter12"), Some(("Chapter", "12")));
    }

    #[test]
    fn test_split_trailing_locator_roman() {
        assert_eq!(
            split_trailing_locator("Preface .... xii"),
            Some(("Preface .... ", "xii"))
        );
        assert_eq!(split_trailing_locator("iv"), Some(("", "iv")));
    }

    #[test]
    fn test_split_trailing_locator_rejects_word_endings() {
        assert_eq!(split_trailing_locator("Basic"), None);
        assert_eq!(split_trailing_locator("Results Summary"), None);
        assert_eq!(split_trailing_locator(""), None);
    }

    #[test]
    fn test_trim_leaders() {
        assert_eq!(trim_leaders("→ → Background .... "), "Background");
        assert_eq!(trim_trailing_leaders("Methods…… →"), "Methods");
        assert_eq!(trim_leaders("....."), "");
    }

    #[test]
    fn test_char_len_counts_scalars() {
        assert_eq!(char_len("β-CTF"), 5);
        assert_eq!(char_len("……"), 2);
    }
}
