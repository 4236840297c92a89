//! Indentation-scope resolution
//!
//! Finds the structural key enclosing a cursor line using indentation
//! alone. Documents are edited live and usually invalid somewhere, so there
//! is no parse: the locator walks backward from the cursor looking for the
//! nearest key line exactly one [`INDENT_STEP`] shallower than the cursor.
//!
//! The walk maintains an indentation ceiling, the shallowest key line seen
//! so far. Key lines at or below the ceiling sit inside blocks that were
//! already closed before the cursor and cannot be ancestors. Once the
//! ceiling drops under the target depth no ancestor can follow, so the walk
//! ends early.

use super::regions::MATCH_KEY;
use super::text::{INDENT_STEP, indent_width, parse_key_line};
use crate::config::{DEFAULT_MAX_LOOKBEHIND, DEFAULT_TAB_SIZE};

/// Structural key enclosing the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CursorScope {
    /// Not inside any named branch (reported as `"match"`).
    TopLevel,
    Key(String),
}

impl CursorScope {
    pub fn key(&self) -> Option<&str> {
        match self {
            CursorScope::TopLevel => None,
            CursorScope::Key(key) => Some(key),
        }
    }

    /// The key, or the `"match"` sentinel at top level.
    pub fn as_str(&self) -> &str {
        self.key().unwrap_or(MATCH_KEY)
    }
}

impl std::fmt::Display for CursorScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeOptions {
    pub tab_size: usize,
    /// Lines above the cursor inspected before giving up.
    pub max_lookbehind: usize,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            max_lookbehind: DEFAULT_MAX_LOOKBEHIND,
        }
    }
}

/// Enclosing key of `cursor_line`, looking only at lines above it.
///
/// Only a key line at exactly `indent(cursor) - INDENT_STEP` qualifies, so a
/// cursor at odd indentation usually resolves to [`CursorScope::TopLevel`].
/// A `match:` key line ends the walk at top level.
pub fn locate_scope<S: AsRef<str>>(
    lines: &[S],
    cursor_line: usize,
    options: ScopeOptions,
) -> CursorScope {
    let Some(current) = lines.get(cursor_line) else {
        return CursorScope::TopLevel;
    };

    let cursor_width = indent_width(current.as_ref(), options.tab_size);
    let Some(target) = cursor_width.checked_sub(INDENT_STEP) else {
        return CursorScope::TopLevel;
    };

    let mut ceiling = cursor_width;
    let first = cursor_line.saturating_sub(options.max_lookbehind);
    for line in lines[first..cursor_line].iter().rev() {
        let Some(key_line) = parse_key_line(line.as_ref()) else {
            continue;
        };
        if key_line.key == MATCH_KEY {
            return CursorScope::TopLevel;
        }

        let width = key_line.width(options.tab_size);
        if width >= ceiling {
            continue;
        }
        if width == target {
            return CursorScope::Key(key_line.key.to_string());
        }
        if width < target {
            return CursorScope::TopLevel;
        }
        ceiling = width;
    }

    CursorScope::TopLevel
}
