//! Line-level text primitives shared by the CLQL analyses
//!
//! CLQL documents are never parsed as a whole; every analysis works on
//! single lines matched against small grammars defined here.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;

/// Indentation added per nesting level.
pub const INDENT_STEP: usize = 2;

/// `<indent><key>:` where key is letters, digits, `-`, `.`, `_`.
static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)([A-Za-z0-9._-]+):").expect("valid key line regex"));

/// `<indent>- <content>` with non-empty content.
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)-[ \t]+\S").expect("valid bullet regex"));

/// `<indent>-` with nothing after it.
static EMPTY_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*-[ \t]*$").expect("valid empty bullet regex"));

/// Immutable view of a document's text.
#[derive(Debug, Clone, Default)]
pub struct DocumentSnapshot {
    text: Rope,
}

impl DocumentSnapshot {
    pub fn new(text: Rope) -> Self {
        Self { text }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(Rope::from_str(text))
    }

    pub fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Line `index` without its line terminator, `None` past the end.
    pub fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        if index >= self.text.len_lines() {
            return None;
        }
        let line: Cow<'_, str> = self.text.line(index).into();
        Some(match line {
            Cow::Borrowed(s) => Cow::Borrowed(trim_line_ending(s)),
            Cow::Owned(s) => Cow::Owned(trim_line_ending(&s).to_string()),
        })
    }

    /// All lines without terminators.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|i| self.line(i).map(Cow::into_owned))
            .collect()
    }
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Width of the leading whitespace in columns, tabs advancing to the next
/// multiple of `tab_size`.
pub fn indent_width(line: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / tab_size + 1) * tab_size,
            _ => break,
        }
    }
    width
}

/// Number of leading space/tab characters.
pub fn leading_whitespace_len(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A line opening a structural key, such as `  go.func:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLine<'a> {
    pub indent: &'a str,
    pub key: &'a str,
}

impl KeyLine<'_> {
    pub fn width(&self, tab_size: usize) -> usize {
        indent_width(self.indent, tab_size)
    }
}

pub fn parse_key_line(line: &str) -> Option<KeyLine<'_>> {
    let captures = KEY_LINE.captures(line)?;
    Some(KeyLine {
        indent: captures.get(1).map_or("", |m| m.as_str()),
        key: captures.get(2)?.as_str(),
    })
}

/// Indentation of a list item line with content, e.g. `  - name: x`.
pub fn bullet_item_indent(line: &str) -> Option<&str> {
    BULLET_ITEM
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn is_empty_bullet(line: &str) -> bool {
    EMPTY_BULLET.is_match(line)
}

/// Characters that may appear in a partially typed identifier.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/')
}

/// Token being typed immediately before char column `column`.
///
/// Returns the token and the char column where it starts.
pub fn partial_token_before(line: &str, column: usize) -> (String, usize) {
    let before: Vec<char> = line.chars().take(column).collect();
    let start = before
        .iter()
        .rposition(|c| !is_token_char(*c))
        .map_or(0, |i| i + 1);
    (before[start..].iter().collect(), start)
}

/// Char column of a UTF-16 column, clamped to the end of `line`.
pub fn utf16_to_char_column(line: &str, column: u32) -> usize {
    let mut units = 0;
    for (index, c) in line.chars().enumerate() {
        if units >= column as usize {
            return index;
        }
        units += c.len_utf16();
    }
    line.chars().count()
}

/// UTF-16 column of a char column.
pub fn char_to_utf16_column(line: &str, column: usize) -> u32 {
    line.chars().take(column).map(char::len_utf16).sum::<usize>() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_width_expands_tabs_to_tab_stops() {
        assert_eq!(indent_width("    x", 4), 4);
        assert_eq!(indent_width("\tx", 4), 4);
        assert_eq!(indent_width("  \tx", 4), 4);
        assert_eq!(indent_width("\t\tx", 2), 4);
        assert_eq!(indent_width("", 4), 0);
    }

    #[test]
    fn test_parse_key_line() {
        let key = parse_key_line("    go.func:").unwrap();
        assert_eq!(key.indent, "    ");
        assert_eq!(key.key, "go.func");

        let key = parse_key_line("name: foo").unwrap();
        assert_eq!(key.key, "name");
        assert_eq!(key.width(4), 0);

        assert!(parse_key_line("  - codelingo/go").is_none());
        assert!(parse_key_line("  # comment: x").is_none());
    }

    #[test]
    fn test_bullets() {
        assert_eq!(bullet_item_indent("  - name: x"), Some("  "));
        assert_eq!(bullet_item_indent("- codelingo/go"), Some(""));
        assert_eq!(bullet_item_indent("  - "), None);
        assert!(is_empty_bullet("  - "));
        assert!(is_empty_bullet("-"));
        assert!(!is_empty_bullet("  - x"));
    }

    #[test]
    fn test_partial_token_before() {
        assert_eq!(partial_token_before("  go.fu", 7), ("go.fu".to_string(), 2));
        assert_eq!(partial_token_before("  - codelingo/g", 15), ("codelingo/g".to_string(), 4));
        assert_eq!(partial_token_before("name: ", 6), (String::new(), 6));
        assert_eq!(partial_token_before("", 0), (String::new(), 0));
    }

    #[test]
    fn test_utf16_columns() {
        // U+1F600 takes two UTF-16 units, U+00E9 one.
        let line = "# \u{1F600} \u{e9}go";
        assert_eq!(utf16_to_char_column(line, 4), 3);
        assert_eq!(utf16_to_char_column(line, 7), 6);
        assert_eq!(utf16_to_char_column(line, 99), 7);
        assert_eq!(char_to_utf16_column(line, 3), 4);
        assert_eq!(char_to_utf16_column(line, 7), 8);
    }

    #[test]
    fn test_snapshot_lines_strip_terminators() {
        let snapshot = DocumentSnapshot::from_text("a:\r\n  b:\n");
        assert_eq!(snapshot.line_count(), 3);
        assert_eq!(snapshot.line(0).as_deref(), Some("a:"));
        assert_eq!(snapshot.line(1).as_deref(), Some("  b:"));
        assert_eq!(snapshot.line(2).as_deref(), Some(""));
        assert_eq!(snapshot.line(3), None);
    }
}
