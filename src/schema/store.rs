//! On-disk lexicon schema cache
//!
//! Layout under the cache root:
//! - `lexicons.json`: JSON array of every known lexicon identifier
//! - `lexicons/<org>/<name>.json`: fact tree of one lexicon
//!
//! Entries are created on first miss by the provider and only read
//! afterwards. Nothing invalidates them automatically; delete the file to
//! force a refresh. Concurrent misses for the same identifier may both
//! invoke the provider, and the last write wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{Result, SchemaError};
use super::provider::{LexiconProvider, LingoCliProvider};
use crate::config::LingoConfig;

/// Fact or property name mapped to its ordered child names.
///
/// An empty child list marks a property (leaf); a non-empty one a fact
/// (branch).
pub type SchemaNode = BTreeMap<String, Vec<String>>;

const LEXICON_LIST_FILE: &str = "lexicons.json";
const FACTS_DIR: &str = "lexicons";

/// Shape of `lingo list-facts -f json` output.
#[derive(Debug, Deserialize)]
struct FactList {
    facts: Vec<FactEntry>,
}

#[derive(Debug, Deserialize)]
struct FactEntry {
    kind: String,
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    facts: Vec<FactEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FactCache {
    Nested(FactList),
    Flat(SchemaNode),
}

impl FactCache {
    fn into_schema(self) -> SchemaNode {
        match self {
            FactCache::Flat(schema) => schema,
            FactCache::Nested(list) => {
                let mut schema = SchemaNode::new();
                for fact in list.facts {
                    flatten_fact(fact, &mut schema);
                }
                schema
            }
        }
    }
}

fn flatten_fact(fact: FactEntry, schema: &mut SchemaNode) {
    let mut children = fact.properties.clone();
    children.extend(fact.facts.iter().map(|f| f.kind.clone()));

    for property in fact.properties {
        schema.entry(property).or_default();
    }
    for sub_fact in fact.facts {
        flatten_fact(sub_fact, schema);
    }
    schema.insert(fact.kind, children);
}

#[derive(Debug, Clone, Copy)]
enum CacheKey<'a> {
    LexiconList,
    Facts(&'a str),
}

/// Resolves lexicon identifiers to fact trees through the on-disk cache.
#[derive(Clone)]
pub struct SchemaStore {
    cache_root: PathBuf,
    provider: Arc<dyn LexiconProvider>,
    repair_cache: bool,
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("cache_root", &self.cache_root)
            .field("provider", &self.provider.provider_name())
            .field("repair_cache", &self.repair_cache)
            .finish()
    }
}

impl SchemaStore {
    pub fn new(cache_root: impl Into<PathBuf>, provider: Arc<dyn LexiconProvider>) -> Self {
        Self {
            cache_root: cache_root.into(),
            provider,
            repair_cache: true,
        }
    }

    /// Build a store backed by the `lingo` CLI.
    pub fn from_config(config: &LingoConfig) -> Self {
        let provider = Arc::new(LingoCliProvider::new(config.provider.clone()));
        Self::new(config.cache_dir.clone(), provider).with_repair_cache(config.repair_cache)
    }

    pub fn with_repair_cache(mut self, repair_cache: bool) -> Self {
        self.repair_cache = repair_cache;
        self
    }

    pub fn lexicon_list_path(&self) -> PathBuf {
        self.cache_root.join(LEXICON_LIST_FILE)
    }

    /// Cache path of a lexicon's fact tree, mirroring its path segments.
    ///
    /// Rejects identifiers that could escape the cache root.
    pub fn fact_cache_path(&self, identifier: &str) -> Result<PathBuf> {
        let segments: Vec<&str> = identifier.split('/').collect();
        let valid = segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\'));
        let Some((last, dirs)) = segments.split_last().filter(|_| valid) else {
            return Err(SchemaError::InvalidIdentifier {
                identifier: identifier.to_string(),
            });
        };

        let mut path = self.cache_root.join(FACTS_DIR);
        for dir in dirs {
            path.push(dir);
        }
        path.push(format!("{}.json", last));
        Ok(path)
    }

    /// Fact tree of `identifier`, invoking the provider on a cache miss.
    pub async fn fetch(&self, identifier: &str) -> Result<SchemaNode> {
        let path = self.fact_cache_path(identifier)?;
        self.load(CacheKey::Facts(identifier), &path, parse_facts).await
    }

    /// Every lexicon identifier the provider knows about.
    pub async fn list_lexicons(&self) -> Result<Vec<String>> {
        let path = self.lexicon_list_path();
        self.load(CacheKey::LexiconList, &path, parse_lexicon_list).await
    }

    async fn load<T>(
        &self,
        key: CacheKey<'_>,
        path: &Path,
        parse: fn(&Path, &[u8]) -> Result<T>,
    ) -> Result<T> {
        if !tokio::fs::try_exists(path).await? {
            debug!("Cache miss for {:?} at {}", key, path.display());
            self.populate(key, path).await?;
        }

        match read_cache(path, parse).await {
            Err(e) if e.is_malformed_cache() && self.repair_cache => {
                warn!("{}; deleting and fetching again", e);
                tokio::fs::remove_file(path).await?;
                self.populate(key, path).await?;
                read_cache(path, parse).await
            }
            other => other,
        }
    }

    async fn populate(&self, key: CacheKey<'_>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match key {
            CacheKey::LexiconList => self.provider.list_lexicons(path).await?,
            CacheKey::Facts(identifier) => self.provider.list_facts(identifier, path).await?,
        }
        if !tokio::fs::try_exists(path).await? {
            return Err(SchemaError::provider(
                self.provider.provider_name(),
                format!("no output written to {}", path.display()),
            ));
        }
        Ok(())
    }
}

async fn read_cache<T>(path: &Path, parse: fn(&Path, &[u8]) -> Result<T>) -> Result<T> {
    let bytes = tokio::fs::read(path).await?;
    parse(path, &bytes)
}

fn malformed(path: &Path, e: serde_json::Error) -> SchemaError {
    SchemaError::MalformedCache {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn parse_facts(path: &Path, bytes: &[u8]) -> Result<SchemaNode> {
    serde_json::from_slice::<FactCache>(bytes)
        .map(FactCache::into_schema)
        .map_err(|e| malformed(path, e))
}

fn parse_lexicon_list(path: &Path, bytes: &[u8]) -> Result<Vec<String>> {
    serde_json::from_slice(bytes).map_err(|e| malformed(path, e))
}
