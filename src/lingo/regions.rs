//! Region classification of CLQL documents
//!
//! Every analysis depends on knowing which section a line belongs to. The
//! classification is consumed through [`RegionClassifier`] so a client that
//! already knows the regions (e.g. from its syntax grammar) can provide
//! them; [`HeaderRegionClassifier`] derives them from section headers.

use super::text::{DocumentSnapshot, bullet_item_indent, indent_width, is_blank, parse_key_line};

/// Named region of a CLQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Before any section header.
    Outer,
    /// Inside `lexicons:`.
    Lexicons,
    /// Inside `tenets:`, outside any query.
    Tenets,
    /// Inside a query block (`match:` or a bare top-level query).
    Query,
}

/// Per-line regions of one document snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regions {
    lines: Vec<Region>,
}

impl Regions {
    pub fn new(lines: Vec<Region>) -> Self {
        Self { lines }
    }

    /// Region of `line`; lines past the end continue the last region.
    pub fn region_at(&self, line: usize) -> Region {
        self.lines
            .get(line)
            .or_else(|| self.lines.last())
            .copied()
            .unwrap_or(Region::Outer)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Column-0 text that is neither a list item nor a comment.
fn starts_query_fact(line: &str) -> bool {
    !line.starts_with(['-', '#'])
}

pub trait RegionClassifier: Send + Sync {
    fn classify(&self, snapshot: &DocumentSnapshot) -> Regions;
}

pub const LEXICONS_HEADER: &str = "lexicons";
pub const TENETS_HEADER: &str = "tenets";
pub const MATCH_KEY: &str = "match";

/// Classifies lines by scanning section headers top-down.
///
/// - column-0 `lexicons:` opens [`Region::Lexicons`]
/// - column-0 `tenets:` opens [`Region::Tenets`]
/// - any other column-0 key opens [`Region::Query`], as does column-0 text
///   after the lexicon list that is not a bullet or a comment
/// - inside tenets, `match:` opens [`Region::Query`] for the lines indented
///   deeper than it
/// - blank lines and other column-0 non-key lines keep the current region
#[derive(Debug, Clone)]
pub struct HeaderRegionClassifier {
    tab_size: usize,
}

impl HeaderRegionClassifier {
    pub fn new(tab_size: usize) -> Self {
        Self { tab_size }
    }

    /// Key of a plain key line or of a list item such as `  - match:`,
    /// with the column the key starts at.
    fn structural_key<'a>(&self, line: &'a str) -> Option<(usize, &'a str)> {
        if let Some(key) = parse_key_line(line) {
            return Some((key.width(self.tab_size), key.key));
        }
        let indent = bullet_item_indent(line)?;
        let after_dash = &line[indent.len() + 1..];
        let content = after_dash.trim_start_matches([' ', '\t']);
        let key = parse_key_line(content)?;
        let width = indent_width(indent, self.tab_size) + 1 + (after_dash.len() - content.len());
        Some((width, key.key))
    }
}

impl RegionClassifier for HeaderRegionClassifier {
    fn classify(&self, snapshot: &DocumentSnapshot) -> Regions {
        let mut section = Region::Outer;
        // Indentation of the `match:` line of the open query, if any.
        let mut open_match: Option<usize> = None;
        let mut lines = Vec::with_capacity(snapshot.line_count());

        for index in 0..snapshot.line_count() {
            let line = snapshot.line(index).unwrap_or_default();
            if is_blank(&line) {
                lines.push(if open_match.is_some() { Region::Query } else { section });
                continue;
            }

            let width = indent_width(&line, self.tab_size);
            if let Some(match_width) = open_match {
                if width > match_width {
                    lines.push(Region::Query);
                    continue;
                }
                open_match = None;
            }

            if width == 0 {
                if let Some(key) = parse_key_line(&line) {
                    section = match key.key {
                        LEXICONS_HEADER => Region::Lexicons,
                        TENETS_HEADER => Region::Tenets,
                        _ => Region::Query,
                    };
                } else if section == Region::Lexicons && starts_query_fact(&line) {
                    // A top-level fact still being typed, before its colon.
                    section = Region::Query;
                }
                lines.push(section);
                continue;
            }

            if section == Region::Tenets {
                if let Some((key_width, MATCH_KEY)) = self.structural_key(&line) {
                    open_match = Some(key_width);
                }
            }
            lines.push(section);
        }

        Regions::new(lines)
    }
}
