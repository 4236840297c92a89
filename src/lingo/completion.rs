//! Completion candidates for CLQL documents
//!
//! Two independent sources:
//! - inside a query: the children of the enclosing fact, or every top-level
//!   fact of the document schema when the cursor is at top level
//! - in the lexicon header: every known lexicon identifier plus the
//!   `lexicons` and `tenets` section keywords
//!
//! Candidates are protocol-agnostic; the LSP layer converts them. Insert
//! texts are snippets.

use std::collections::HashSet;

use super::namespace::DocumentSchema;
use super::regions::{LEXICONS_HEADER, TENETS_HEADER};
use super::scope::CursorScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// Branch node with children.
    Fact,
    /// Leaf node.
    Property,
    Lexicon,
    Keyword,
}

impl CompletionKind {
    pub fn label(&self) -> &'static str {
        match self {
            CompletionKind::Fact => "fact",
            CompletionKind::Property => "property",
            CompletionKind::Lexicon => "lexicon",
            CompletionKind::Keyword => "keyword",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub label: String,
    /// Snippet inserted in place of the partial token.
    pub insert_text: String,
    pub kind: CompletionKind,
}

impl Completion {
    fn new(label: impl Into<String>, insert_text: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            insert_text: insert_text.into(),
            kind,
        }
    }

    fn fact(name: &str) -> Self {
        Self::new(name, format!("{}:\n  $0", escape_snippet(name)), CompletionKind::Fact)
    }

    fn property(name: &str) -> Self {
        Self::new(name, format!("{}: ${{1}}", escape_snippet(name)), CompletionKind::Property)
    }
}

fn escape_snippet(text: &str) -> String {
    text.replace('\\', "\\\\").replace('$', "\\$").replace('}', "\\}")
}

/// Schema completions for `scope`, filtered by `partial`.
///
/// A scope naming a schema key offers exactly that key's children; any
/// other scope offers the schema's top-level keys.
pub fn complete(schema: &DocumentSchema, scope: &CursorScope, partial: &str) -> Vec<Completion> {
    let candidates: Vec<&str> = match scope.key().and_then(|key| schema.children(key)) {
        Some(children) => children.iter().map(String::as_str).collect(),
        None => schema.top_level_keys(),
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|name| name.starts_with(partial) && seen.insert(*name))
        .map(|name| match schema.children(name) {
            Some(children) if !children.is_empty() => Completion::fact(name),
            _ => Completion::property(name),
        })
        .collect()
}

/// Lexicon header completions, filtered by `partial`.
///
/// Identifiers get a `- ` bullet unless the line already has one.
pub fn complete_lexicons(lexicons: &[String], partial: &str, line_has_bullet: bool) -> Vec<Completion> {
    let mut seen = HashSet::new();
    let mut completions: Vec<Completion> = lexicons
        .iter()
        .filter(|id| id.starts_with(partial) && seen.insert(id.as_str()))
        .map(|id| {
            let insert = if line_has_bullet {
                escape_snippet(id)
            } else {
                format!("- {}", escape_snippet(id))
            };
            Completion::new(id.as_str(), insert, CompletionKind::Lexicon)
        })
        .collect();

    let keywords = [
        (LEXICONS_HEADER, "lexicons:\n  - $0"),
        (TENETS_HEADER, "tenets:\n  - name: $0"),
    ];
    completions.extend(
        keywords
            .into_iter()
            .filter(|(keyword, _)| keyword.starts_with(partial) && !seen.contains(keyword))
            .map(|(keyword, template)| Completion::new(keyword, template, CompletionKind::Keyword)),
    );
    completions
}
