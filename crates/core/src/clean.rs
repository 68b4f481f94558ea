//! Removal of characters that spreadsheet cells cannot hold.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// ASCII control characters other than tab, line feed and carriage return.
static ILLEGAL_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").unwrap());

/// Strip control characters in 0x00-0x08, 0x0B, 0x0C and 0x0E-0x1F.
///
/// Tabs, newlines and carriage returns are kept. Applying this twice gives
/// the same result as applying it once.
pub fn strip_control_chars(text: &str) -> String {
    strip_control_chars_cow(text).into_owned()
}

/// Like [`strip_control_chars`] but avoids allocating when nothing changes.
pub fn strip_control_chars_cow(text: &str) -> Cow<'_, str> {
    ILLEGAL_CHARS_REGEX.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_illegal_ranges() {
        assert_eq!(strip_control_chars("a\u{0000}b\u{0008}c"), "abc");
        assert_eq!(strip_control_chars("a\u{000B}b\u{000C}c"), "abc");
        assert_eq!(strip_control_chars("a\u{000E}b\u{001F}c"), "abc");
    }

    #[test]
    fn test_keeps_tab_newline_and_carriage_return() {
        assert_eq!(strip_control_chars("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_keeps_printable_and_unicode() {
        let text = "WHO — définition de la santé 💪";
        assert_eq!(strip_control_chars(text), text);
        assert!(matches!(strip_control_chars_cow(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "plain",
            "\u{0001}\u{0002}mixed\u{000B}\u{001F}\ttext\n",
            "\u{0000}\u{0000}\u{0000}",
        ];
        for input in inputs {
            let once = strip_control_chars(input);
            let twice = strip_control_chars(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }
}
