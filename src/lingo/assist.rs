//! Editing assistance: list continuation on newline, indentation
//! normalization on save.

use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::debug;

use super::regions::{LEXICONS_HEADER, Region, Regions, TENETS_HEADER};
use super::text::{
    DocumentSnapshot, INDENT_STEP, bullet_item_indent, indent_width, is_empty_bullet,
    leading_whitespace_len, parse_key_line,
};

fn position(line: usize, character: usize) -> Position {
    Position::new(line as u32, character as u32)
}

fn is_header(line: &str, header: &str) -> bool {
    parse_key_line(line).is_some_and(|k| k.key == header)
}

/// Indentation for the line after a section header: one step deeper, as a
/// list item.
fn bullet_under(header_line: &str, tab_size: usize) -> String {
    format!("{}- ", " ".repeat(indent_width(header_line, tab_size) + INDENT_STEP))
}

/// Edit to apply after a newline created line `new_line`.
///
/// Looks at the line just completed (`new_line - 1`):
/// - an empty bullet is removed together with the newline
/// - after `lexicons:` or a lexicon bullet, a new bullet is started
/// - after `tenets:`, a first tenet bullet is started
/// - after a bullet inside tenets or a query, the new line is indented to
///   continue the bullet's mapping
///
/// The returned edit replaces the new line's leading whitespace, so it does
/// not depend on the client's own auto-indent.
pub fn on_newline(
    snapshot: &DocumentSnapshot,
    regions: &Regions,
    new_line: usize,
    tab_size: usize,
) -> Option<TextEdit> {
    let previous_index = new_line.checked_sub(1)?;
    let previous = snapshot.line(previous_index)?;
    let current = snapshot.line(new_line).unwrap_or_default();
    let current_ws = leading_whitespace_len(&current);
    let region = regions.region_at(previous_index);

    if region != Region::Outer && is_empty_bullet(&previous) {
        debug!("Removing empty list item on line {}", previous_index);
        return Some(TextEdit::new(
            Range::new(position(previous_index, 0), position(new_line, current_ws)),
            String::new(),
        ));
    }

    let prefix = match region {
        Region::Lexicons if is_header(&previous, LEXICONS_HEADER) => {
            bullet_under(&previous, tab_size)
        }
        Region::Lexicons => format!("{}- ", bullet_item_indent(&previous)?),
        Region::Tenets if is_header(&previous, TENETS_HEADER) => bullet_under(&previous, tab_size),
        Region::Tenets | Region::Query => {
            format!("{}{}", bullet_item_indent(&previous)?, " ".repeat(INDENT_STEP))
        }
        Region::Outer => return None,
    };

    if current[..current_ws] == prefix {
        return None;
    }
    Some(TextEdit::new(
        Range::new(position(new_line, 0), position(new_line, current_ws)),
        prefix,
    ))
}

/// Edits normalizing query indentation before a save.
///
/// For every query line among the first `max_lines`: leading tabs are
/// expanded to spaces, and a key line at odd indentation gains one space.
/// Applying the edits and running the pass again yields no edits.
pub fn on_before_save(
    snapshot: &DocumentSnapshot,
    regions: &Regions,
    tab_size: usize,
    max_lines: usize,
) -> Vec<TextEdit> {
    let mut edits = Vec::new();

    for index in 0..snapshot.line_count().min(max_lines) {
        if regions.region_at(index) != Region::Query {
            continue;
        }
        let Some(line) = snapshot.line(index) else {
            break;
        };

        let ws_len = leading_whitespace_len(&line);
        let ws = &line[..ws_len];
        let width = indent_width(&line, tab_size);
        let odd_key = width % 2 == 1 && parse_key_line(&line).is_some();

        if ws.contains('\t') {
            let spaces = " ".repeat(if odd_key { width + 1 } else { width });
            edits.push(TextEdit::new(
                Range::new(position(index, 0), position(index, ws_len)),
                spaces,
            ));
        } else if odd_key {
            edits.push(TextEdit::new(
                Range::new(position(index, 0), position(index, 0)),
                " ".to_string(),
            ));
        }
    }

    if !edits.is_empty() {
        debug!("Normalizing indentation of {} query lines", edits.len());
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lingo::regions::{HeaderRegionClassifier, RegionClassifier};

    fn snapshot_and_regions(text: &str) -> (DocumentSnapshot, Regions) {
        let snapshot = DocumentSnapshot::from_text(text);
        let regions = HeaderRegionClassifier::new(4).classify(&snapshot);
        (snapshot, regions)
    }

    fn newline_edit(text: &str, new_line: usize) -> Option<TextEdit> {
        let (snapshot, regions) = snapshot_and_regions(text);
        on_newline(&snapshot, &regions, new_line, 4)
    }

    #[test]
    fn test_empty_bullet_is_removed() {
        let edit = newline_edit("lexicons:\n  - \n  ", 2).expect("edit expected");
        assert_eq!(edit.range, Range::new(Position::new(1, 0), Position::new(2, 2)));
        assert_eq!(edit.new_text, "");
    }

    #[test]
    fn test_lexicons_header_starts_bullet() {
        let edit = newline_edit("lexicons:\n", 1).expect("edit expected");
        assert_eq!(edit.range, Range::new(Position::new(1, 0), Position::new(1, 0)));
        assert_eq!(edit.new_text, "  - ");
    }

    #[test]
    fn test_lexicon_bullet_continues_list() {
        let edit = newline_edit("lexicons:\n  - codelingo/go as go\n  ", 2).expect("edit expected");
        assert_eq!(edit.range, Range::new(Position::new(2, 0), Position::new(2, 2)));
        assert_eq!(edit.new_text, "  - ");
    }

    #[test]
    fn test_tenets_header_starts_bullet() {
        let edit = newline_edit("tenets:\n", 1).expect("edit expected");
        assert_eq!(edit.new_text, "  - ");
    }

    #[test]
    fn test_tenet_bullet_continues_mapping() {
        let edit = newline_edit("tenets:\n  - name: x\n  ", 2).expect("edit expected");
        assert_eq!(edit.new_text, "    ");
        assert_eq!(edit.range, Range::new(Position::new(2, 0), Position::new(2, 2)));
    }

    #[test]
    fn test_no_edit_when_indent_already_right() {
        assert_eq!(newline_edit("tenets:\n  - name: x\n    ", 2), None);
    }

    #[test]
    fn test_no_edit_for_plain_lines() {
        assert_eq!(newline_edit("match:\n  go.func:\n    ", 2), None);
        assert_eq!(newline_edit("# comment\n", 1), None);
        assert_eq!(newline_edit("", 0), None);
    }

    #[test]
    fn test_save_rounds_odd_key_indentation_up() {
        let (snapshot, regions) = snapshot_and_regions("match:\n   go.func:\n     name: x\n");
        let edits = on_before_save(&snapshot, &regions, 4, 100);
        assert_eq!(
            edits,
            vec![
                TextEdit::new(Range::new(Position::new(1, 0), Position::new(1, 0)), " ".into()),
                TextEdit::new(Range::new(Position::new(2, 0), Position::new(2, 0)), " ".into()),
            ]
        );
    }

    #[test]
    fn test_save_expands_tabs() {
        let (snapshot, regions) = snapshot_and_regions("match:\n\tgo.func:\n");
        let edits = on_before_save(&snapshot, &regions, 2, 100);
        assert_eq!(
            edits,
            vec![TextEdit::new(Range::new(Position::new(1, 0), Position::new(1, 1)), "  ".into())]
        );
    }

    #[test]
    fn test_save_ignores_non_query_regions() {
        let (snapshot, regions) = snapshot_and_regions("lexicons:\n   - codelingo/go\ntenets:\n   name: x\n");
        assert!(on_before_save(&snapshot, &regions, 4, 100).is_empty());
    }

    #[test]
    fn test_save_respects_line_limit() {
        let (snapshot, regions) = snapshot_and_regions("match:\n   go.func:\n");
        assert!(on_before_save(&snapshot, &regions, 4, 1).is_empty());
    }
}
