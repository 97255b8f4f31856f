//! Text normalization for extracted node text.
//!
//! Article pages are full of soft line breaks, non-breaking spaces and
//! zero-width characters left behind by the platform editor. Every piece of
//! text that leaves the walker goes through [`normalize`].

use crate::patterns::WHITESPACE_RUN;

/// Zero-width characters removed outright.
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Clean up extracted text.
///
/// - trims leading and trailing whitespace
/// - turns carriage returns, line feeds and non-breaking spaces into spaces
/// - removes zero-width space / non-joiner / joiner characters
/// - collapses every run of two or more whitespace characters to one space
///
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use wechatmp2markdown::normalize::normalize;
///
/// assert_eq!(normalize("  Hello\n\n  world\u{200B} "), "Hello world");
/// assert_eq!(normalize("a\u{00A0}b"), "a b");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let replaced: String = trimmed
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(|c| match c {
            '\r' | '\n' | '\u{00A0}' => ' ',
            other => other,
        })
        .collect();

    WHITESPACE_RUN.replace_all(&replaced, " ").trim().to_string()
}

/// Whether text is empty once normalized.
#[inline]
#[must_use]
pub fn is_blank(text: &str) -> bool {
    normalize(text).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses() {
        assert_eq!(normalize("  a  b   c  "), "a b c");
        assert_eq!(normalize("a \t\n b"), "a b");
        assert_eq!(normalize("\t\t"), "");
    }

    #[test]
    fn test_single_newlines_become_spaces() {
        assert_eq!(normalize("line one\nline two\rline three"), "line one line two line three");
    }

    #[test]
    fn test_single_tab_is_kept() {
        assert_eq!(normalize("a\tb"), "a\tb");
    }

    #[test]
    fn test_platform_whitespace() {
        assert_eq!(normalize("a\u{00A0}\u{00A0}b"), "a b");
        assert_eq!(normalize("\u{200B}a\u{200C}b\u{200D}"), "ab");
        // Removing a zero-width character can create a new double space.
        assert_eq!(normalize("a \u{200B} b"), "a b");
        assert_eq!(normalize("\u{00A0}padded\u{00A0}"), "padded");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "plain",
            "  Hello\n\n  world\u{200B} ",
            "a\u{00A0} \u{200D}\tb",
            "中文\u{3000}\u{3000}段落",
            "\r\n\r\nx\r\n",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(" \u{200B}\n\u{00A0}"));
        assert!(!is_blank(" x "));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Text made of letters and every kind of whitespace the editor leaves
        /// behind.
        const PAGE_TEXT: &str =
            "[ab \t\n\r\u{000B}\u{000C}\u{0085}\u{00A0}\u{200B}\u{200C}\u{200D}\u{FEFF}\u{2028}\u{3000}]{0,64}";

        proptest! {
            #[test]
            fn normalize_is_idempotent(input in PAGE_TEXT) {
                let once = normalize(&input);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn normalize_collapses_whitespace(input in PAGE_TEXT) {
                let output = normalize(&input);
                prop_assert!(!output.contains("  "), "double space in {:?}", output);
                prop_assert!(!output.contains('\n') && !output.contains('\r'));
                prop_assert_eq!(output.trim(), output.as_str());
                for zero_width in ZERO_WIDTH {
                    prop_assert!(!output.contains(zero_width));
                }
            }

            #[test]
            fn normalize_keeps_every_letter(input in PAGE_TEXT) {
                let letters = |s: &str| s.chars().filter(char::is_ascii_alphabetic).collect::<String>();
                prop_assert_eq!(letters(&normalize(&input)), letters(&input));
            }
        }
    }
}
