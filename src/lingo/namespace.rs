//! Document-scoped schema from lexicon alias declarations
//!
//! Header lines of the form `- <lexicon>[ as <alias>]` import a lexicon's
//! facts under a namespace prefix:
//! - `as _` imports them unqualified
//! - no alias uses the last path segment (`codelingo/go` -> `go.`)
//! - any other alias is used as is (`as golang` -> `golang.`)

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::regions::{Region, Regions};
use super::text::DocumentSnapshot;
use crate::schema::{SchemaNode, SchemaStore};

/// Alias meaning "no namespace prefix".
pub const UNQUALIFIED_ALIAS: &str = "_";

static ALIAS_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*-\s+([A-Za-z0-9_.-]+(?:/[A-Za-z0-9_.-]+)+)(?:\s+as\s+([A-Za-z0-9_]+))?\s*$",
    )
    .expect("valid alias declaration regex")
});

/// One `- <lexicon>[ as <alias>]` header line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasDeclaration {
    pub lexicon: String,
    pub alias: Option<String>,
}

impl AliasDeclaration {
    pub fn new(lexicon: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            lexicon: lexicon.into(),
            alias: alias.map(str::to_string),
        }
    }

    pub fn parse(line: &str) -> Option<Self> {
        let captures = ALIAS_DECLARATION.captures(line)?;
        Some(Self {
            lexicon: captures.get(1)?.as_str().to_string(),
            alias: captures.get(2).map(|m| m.as_str().to_string()),
        })
    }

    /// Prefix prepended to every fact and property of the lexicon.
    pub fn namespace_prefix(&self) -> String {
        match self.alias.as_deref() {
            Some(UNQUALIFIED_ALIAS) => String::new(),
            Some(alias) => format!("{}.", alias),
            None => {
                let last = self.lexicon.rsplit('/').next().unwrap_or(&self.lexicon);
                format!("{}.", last)
            }
        }
    }
}

/// Union of the namespaced fact trees imported by one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSchema {
    nodes: BTreeMap<String, Vec<String>>,
}

impl DocumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every node of `schema` under `prefix`; later imports win on
    /// key collisions.
    pub fn merge(&mut self, prefix: &str, schema: &SchemaNode) {
        for (fact, children) in schema {
            let children = children
                .iter()
                .map(|child| format!("{}{}", prefix, child))
                .collect();
            self.nodes.insert(format!("{}{}", prefix, fact), children);
        }
    }

    pub fn children(&self, key: &str) -> Option<&[String]> {
        self.nodes.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Keys that are not listed as a child of any other key.
    pub fn top_level_keys(&self) -> Vec<&str> {
        let nested: HashSet<&str> = self
            .nodes
            .values()
            .flat_map(|children| children.iter().map(String::as_str))
            .collect();
        self.nodes
            .keys()
            .map(String::as_str)
            .filter(|key| !nested.contains(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for DocumentSchema {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Alias declarations of the lexicon section, in document order.
///
/// Scanning stops at the first tenets or query line, or after `max_lines`.
pub fn scan_declarations(
    snapshot: &DocumentSnapshot,
    regions: &Regions,
    max_lines: usize,
) -> Vec<AliasDeclaration> {
    let mut declarations = Vec::new();
    for index in 0..snapshot.line_count().min(max_lines) {
        if matches!(regions.region_at(index), Region::Tenets | Region::Query) {
            break;
        }
        if let Some(declaration) = snapshot.line(index).and_then(|l| AliasDeclaration::parse(&l)) {
            declarations.push(declaration);
        }
    }
    declarations
}

/// Build the schema for a document: the common lexicon imported
/// unqualified, then every declared lexicon in order.
///
/// A lexicon that cannot be fetched is skipped; the others still apply.
pub async fn resolve_document_schema(
    snapshot: &DocumentSnapshot,
    regions: &Regions,
    store: &SchemaStore,
    common_lexicon: &str,
    max_header_lines: usize,
) -> DocumentSchema {
    let mut declarations = vec![AliasDeclaration::new(common_lexicon, Some(UNQUALIFIED_ALIAS))];
    declarations.extend(scan_declarations(snapshot, regions, max_header_lines));

    // Repeated declarations are merged again so the last one wins; the warm
    // cache makes the extra fetches cheap.
    let mut schema = DocumentSchema::new();
    for declaration in declarations {
        match store.fetch(&declaration.lexicon).await {
            Ok(facts) => {
                let prefix = declaration.namespace_prefix();
                debug!(
                    "Imported {} facts from {} with prefix {:?}",
                    facts.len(),
                    declaration.lexicon,
                    prefix
                );
                schema.merge(&prefix, &facts);
            }
            Err(e) => warn!("Skipping lexicon {}: {}", declaration.lexicon, e),
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        assert_eq!(
            AliasDeclaration::parse("  - codelingo/go as go"),
            Some(AliasDeclaration::new("codelingo/go", Some("go")))
        );
        assert_eq!(
            AliasDeclaration::parse("- codelingo/common   "),
            Some(AliasDeclaration::new("codelingo/common", None))
        );
        assert_eq!(
            AliasDeclaration::parse("\t- codelingo/php as _"),
            Some(AliasDeclaration::new("codelingo/php", Some("_")))
        );
        assert_eq!(AliasDeclaration::parse("lexicons:"), None);
        assert_eq!(AliasDeclaration::parse("  - golang"), None);
        assert_eq!(AliasDeclaration::parse("  - codelingo/go as"), None);
    }

    #[test]
    fn test_namespace_prefix() {
        assert_eq!(AliasDeclaration::new("a/b", Some("c")).namespace_prefix(), "c.");
        assert_eq!(AliasDeclaration::new("a/b", Some("_")).namespace_prefix(), "");
        assert_eq!(AliasDeclaration::new("a/b", None).namespace_prefix(), "b.");
        assert_eq!(AliasDeclaration::new("org/sub/name", None).namespace_prefix(), "name.");
    }

    #[test]
    fn test_merge_prefixes_keys_and_children() {
        let facts: SchemaNode = [
            ("func".to_string(), vec!["name".to_string()]),
            ("name".to_string(), vec![]),
        ]
        .into_iter()
        .collect();

        let mut schema = DocumentSchema::new();
        schema.merge("go.", &facts);

        assert_eq!(schema.children("go.func"), Some(&["go.name".to_string()][..]));
        assert_eq!(schema.children("go.name"), Some(&[][..]));
        assert_eq!(schema.top_level_keys(), vec!["go.func"]);
    }

    fn declarations(text: &str, max_lines: usize) -> Vec<AliasDeclaration> {
        use crate::lingo::regions::{HeaderRegionClassifier, RegionClassifier};

        let snapshot = DocumentSnapshot::from_text(text);
        let regions = HeaderRegionClassifier::new(4).classify(&snapshot);
        scan_declarations(&snapshot, &regions, max_lines)
    }

    #[test]
    fn test_scan_stops_at_tenets() {
        let text = "lexicons:\n  - codelingo/go as go\ntenets:\n  - acme/x\n  - acme/y as y\n";
        assert_eq!(
            declarations(text, 50),
            vec![AliasDeclaration::new("codelingo/go", Some("go"))]
        );
    }

    #[test]
    fn test_scan_stops_at_bare_query() {
        let text = "lexicons:\n  - codelingo/go\ngo.func:\n  - acme/x\n";
        assert_eq!(declarations(text, 50), vec![AliasDeclaration::new("codelingo/go", None)]);
    }

    #[test]
    fn test_scan_is_bounded_by_header_lines() {
        let mut text = String::from("lexicons:\n");
        for i in 0..49 {
            text.push_str(&format!("  - acme/lex{}\n", i));
        }
        // Line 50 (0-based), the 51st line of the document.
        text.push_str("  - acme/late\n");

        let found = declarations(&text, 50);
        assert_eq!(found.len(), 49);
        assert!(!found.iter().any(|d| d.lexicon == "acme/late"));
        assert!(declarations(&text, 51).iter().any(|d| d.lexicon == "acme/late"));
    }

    #[test]
    fn test_last_import_wins_on_collision() {
        let first: SchemaNode = [("func".to_string(), vec!["a".to_string()])].into_iter().collect();
        let second: SchemaNode = [("func".to_string(), vec!["b".to_string()])].into_iter().collect();

        let mut schema = DocumentSchema::new();
        schema.merge("", &first);
        schema.merge("", &second);

        assert_eq!(schema.children("func"), Some(&["b".to_string()][..]));
    }
}
