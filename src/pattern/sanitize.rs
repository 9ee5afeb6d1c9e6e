//! Content Sanitizer
//!
//! Strips the envelope's own delimiter syntax from any text that will be
//! interpolated into a prompt: runs of 10-or-more `*` or `!`, and the
//! literal placeholder tokens. Without this, a pattern body or input
//! document could forge envelope sections.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::{INPUT_PLACEHOLDER, PATTERN_PLACEHOLDER};

static ASTERISK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{10,}").expect("valid regex"));
static BANG_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{10,}").expect("valid regex"));

/// Remove every run of >=10 `*` or `!` and the literal envelope
/// placeholder tokens. Pure, total, and idempotent.
///
/// Runs to a fixpoint: a removal can splice surviving fragments into a
/// fresh delimiter (`"*****{input}*****"` becomes a 10-star run after
/// the token is stripped), so a single pass is not enough.
pub fn sanitize(content: &str) -> String {
    let mut current = content.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(content: &str) -> String {
    let content = ASTERISK_RUNS.replace_all(content, "");
    let content = BANG_RUNS.replace_all(&content, "");
    content
        .replace(PATTERN_PLACEHOLDER, "")
        .replace(INPUT_PLACEHOLDER, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_removes_long_asterisk_run() {
        let input = format!("a{}b", "*".repeat(12));
        assert_eq!(sanitize(&input), "ab");
    }

    #[test]
    fn test_removes_long_bang_run() {
        let input = format!("x{}y", "!".repeat(10));
        assert_eq!(sanitize(&input), "xy");
    }

    #[test]
    fn test_keeps_short_runs() {
        assert_eq!(sanitize("**bold** wow!!!"), "**bold** wow!!!");
        assert_eq!(sanitize(&"*".repeat(9)), "*".repeat(9));
    }

    #[test]
    fn test_strips_placeholder_tokens() {
        assert_eq!(sanitize("a{patternContents}b{input}c"), "abc");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_spliced_delimiter_still_removed() {
        // the token removal joins two short runs into a long one
        assert_eq!(sanitize("*****{input}*****"), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in ".*") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_output_has_no_delimiters(s in ".*") {
            let out = sanitize(&s);
            prop_assert!(!out.contains(&"*".repeat(10)));
            prop_assert!(!out.contains(&"!".repeat(10)));
            let pattern_token = "{patternContents}";
            let input_token = "{input}";
            prop_assert!(!out.contains(pattern_token));
            prop_assert!(!out.contains(input_token));
        }
    }
}
