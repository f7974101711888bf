//! Query text cleanup before submission.
//!
//! Comment stripping is purely textual: `--` or `/*` inside string literals
//! is treated as a comment too.

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid block comment regex"));

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--.*?\n").expect("valid line comment regex"));

// Only anchors at the very end of the text (no multi-line flag).
static TRAILING_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--.*?$").expect("valid trailing comment regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Flattens a query to a single line.
///
/// Removes block comments, line comments and a comment on the last line,
/// collapses whitespace runs to one space, trims, and drops a single
/// trailing `;`. Comment-only or blank input yields an empty string.
pub fn normalize_query(raw: &str) -> String {
    let text = BLOCK_COMMENT.replace_all(raw, "");
    let text = LINE_COMMENT.replace_all(&text, "\n");
    let text = TRAILING_COMMENT.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    text.strip_suffix(';').unwrap_or(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_semicolon_and_comment() {
        assert_eq!(normalize_query("SELECT 1; -- comment\n"), "SELECT 1");
    }

    #[test]
    fn test_block_comments_across_lines() {
        let raw = "/* header\n   spans lines */\nSELECT event\n/* inline */FROM events";
        assert_eq!(normalize_query(raw), "SELECT event FROM events");
    }

    #[test]
    fn test_line_comments_keep_line_breaks_as_spaces() {
        let raw = "SELECT event -- the event\nFROM events -- table\nLIMIT 10";
        assert_eq!(normalize_query(raw), "SELECT event FROM events LIMIT 10");
    }

    #[test]
    fn test_comment_at_end_of_text() {
        assert_eq!(normalize_query("SELECT 1 -- no newline"), "SELECT 1");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let raw = "  SELECT\tcount()\n\n   FROM   events\r\n";
        assert_eq!(normalize_query(raw), "SELECT count() FROM events");
    }

    #[test]
    fn test_only_one_semicolon_removed() {
        assert_eq!(normalize_query("SELECT 1;;"), "SELECT 1;");
    }

    #[test]
    fn test_comment_only_input_is_empty() {
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("   \n\t "), "");
        assert_eq!(normalize_query("-- just a note\n/* and a block */\n-- end"), "");
        assert_eq!(normalize_query(";"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "SELECT 1; -- comment\n",
            "/* a */ SELECT\n  properties.$browser AS browser\nFROM events -- x\nWHERE event = '$pageview';",
            "select  count()  from persons",
            "",
        ];
        for raw in inputs {
            let once = normalize_query(raw);
            assert_eq!(normalize_query(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn test_dashes_inside_literal_are_stripped() {
        // Textual stripping does not understand string literals.
        assert_eq!(
            normalize_query("SELECT 'a--b' AS s\nFROM events"),
            "SELECT 'a FROM events"
        );
    }
}
