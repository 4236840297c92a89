//! Shared fixtures for integration tests: an in-process lexicon provider
//! that writes canned JSON and counts its invocations.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use tempfile::TempDir;

use lingo_language_server::lingo::{EditorHooks, HookSettings};
use lingo_language_server::schema::{LexiconProvider, Result, SchemaError, SchemaStore};

/// What the fake does when asked for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Write the canned JSON.
    Serve,
    /// Fail as if the tool could not be run.
    Fail,
    /// Report success without writing anything.
    Silent,
}

#[derive(Debug)]
pub struct FakeProvider {
    lexicons: Vec<String>,
    facts: HashMap<String, Value>,
    behavior: FakeBehavior,
    pub list_calls: AtomicUsize,
    pub fact_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            lexicons: Vec::new(),
            facts: HashMap::new(),
            behavior,
            list_calls: AtomicUsize::new(0),
            fact_calls: AtomicUsize::new(0),
        }
    }

    /// The lexicons used across the integration tests.
    pub fn codelingo() -> Self {
        Self::new(FakeBehavior::Serve)
            .with_lexicons(&["codelingo/common", "codelingo/go", "codelingo/php"])
            .with_facts(
                "codelingo/common",
                json!({ "match": [], "exclude": [], "include": [] }),
            )
            .with_facts(
                "codelingo/go",
                json!({
                    "func": ["name", "args", "block"],
                    "name": [],
                    "args": [],
                    "block": ["stmt"],
                    "stmt": []
                }),
            )
            .with_facts(
                "codelingo/php",
                json!({
                    "facts": [
                        { "kind": "class", "properties": ["name"],
                          "facts": [{ "kind": "method", "properties": ["name", "visibility"] }] }
                    ]
                }),
            )
    }

    pub fn with_lexicons(mut self, lexicons: &[&str]) -> Self {
        self.lexicons = lexicons.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_facts(mut self, lexicon: &str, facts: Value) -> Self {
        self.facts.insert(lexicon.to_string(), facts);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fact_calls(&self) -> usize {
        self.fact_calls.load(Ordering::SeqCst)
    }

    fn unavailable(&self, what: &str) -> SchemaError {
        SchemaError::ProviderUnavailable {
            command: format!("fake {}", what),
            reason: "provider offline".to_string(),
        }
    }

    async fn write(&self, output: &Path, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
        tokio::fs::write(output, bytes).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LexiconProvider for FakeProvider {
    async fn list_lexicons(&self, output: &Path) -> Result<()> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            FakeBehavior::Fail => Err(self.unavailable("list-lexicons")),
            FakeBehavior::Silent => Ok(()),
            FakeBehavior::Serve => self.write(output, &json!(self.lexicons)).await,
        }
    }

    async fn list_facts(&self, lexicon: &str, output: &Path) -> Result<()> {
        self.fact_calls.fetch_add(1, Ordering::SeqCst);
        match (self.behavior, self.facts.get(lexicon)) {
            (FakeBehavior::Fail, _) | (FakeBehavior::Serve, None) => {
                Err(self.unavailable("list-facts"))
            }
            (FakeBehavior::Silent, _) => Ok(()),
            (FakeBehavior::Serve, Some(facts)) => self.write(output, facts).await,
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A store over a fresh temporary cache directory.
///
/// The directory lives as long as the returned `TempDir`.
pub fn temp_store(provider: Arc<FakeProvider>) -> (TempDir, SchemaStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SchemaStore::new(dir.path(), provider);
    (dir, store)
}

/// Hooks over a temporary store with default settings.
pub fn temp_hooks(provider: Arc<FakeProvider>) -> (TempDir, EditorHooks) {
    let (dir, store) = temp_store(provider);
    (dir, EditorHooks::with_store(store, HookSettings::default()))
}
