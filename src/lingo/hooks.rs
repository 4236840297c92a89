//! Host-facing entry points
//!
//! Each hook takes an immutable document snapshot plus cursor and returns a
//! plain result, so the analyses never talk to the editor directly. Domain
//! failures degrade to "no completions" or "no edit" and are only logged.

use std::sync::Arc;

use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::{debug, warn};

use super::assist;
use super::completion::{Completion, complete, complete_lexicons};
use super::namespace::resolve_document_schema;
use super::regions::{HeaderRegionClassifier, Region, RegionClassifier};
use super::scope::{ScopeOptions, locate_scope};
use super::text::{
    DocumentSnapshot, char_to_utf16_column, partial_token_before, utf16_to_char_column,
};
use crate::config::LingoConfig;
use crate::schema::SchemaStore;

/// Tunables of the hooks, taken from [`LingoConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSettings {
    pub common_lexicon: String,
    pub tab_size: usize,
    pub max_header_lines: usize,
    pub max_lookbehind: usize,
    pub max_save_lines: usize,
}

impl From<&LingoConfig> for HookSettings {
    fn from(config: &LingoConfig) -> Self {
        Self {
            common_lexicon: config.common_lexicon.clone(),
            tab_size: config.tab_size,
            max_header_lines: config.max_header_lines,
            max_lookbehind: config.max_lookbehind,
            max_save_lines: config.max_save_lines,
        }
    }
}

impl Default for HookSettings {
    fn default() -> Self {
        Self::from(&LingoConfig::default())
    }
}

/// Completions together with the range of the partial token they replace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggestions {
    pub items: Vec<Completion>,
    pub replace: Range,
}

pub struct EditorHooks {
    store: SchemaStore,
    classifier: Arc<dyn RegionClassifier>,
    settings: HookSettings,
}

impl std::fmt::Debug for EditorHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHooks")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl EditorHooks {
    pub fn new(store: SchemaStore, classifier: Arc<dyn RegionClassifier>, settings: HookSettings) -> Self {
        Self {
            store,
            classifier,
            settings,
        }
    }

    /// Hooks backed by the `lingo` CLI and header-based region detection.
    pub fn from_config(config: &LingoConfig) -> Self {
        Self::with_store(SchemaStore::from_config(config), HookSettings::from(config))
    }

    /// Hooks over `store` with header-based region detection.
    pub fn with_store(store: SchemaStore, settings: HookSettings) -> Self {
        let classifier = Arc::new(HeaderRegionClassifier::new(settings.tab_size));
        Self::new(store, classifier, settings)
    }

    pub fn settings(&self) -> &HookSettings {
        &self.settings
    }

    pub async fn on_completion_requested(
        &self,
        snapshot: &DocumentSnapshot,
        cursor: Position,
    ) -> Suggestions {
        let line_index = cursor.line as usize;
        let Some(line) = snapshot.line(line_index) else {
            return Suggestions::default();
        };
        // Editor columns count UTF-16 units.
        let column = utf16_to_char_column(&line, cursor.character);
        let (partial, start) = partial_token_before(&line, column);
        let replace = Range::new(
            Position::new(cursor.line, char_to_utf16_column(&line, start)),
            cursor,
        );

        let regions = self.classifier.classify(snapshot);
        let region = regions.region_at(line_index);
        debug!("Completion at {:?} in {:?} region, partial {:?}", cursor, region, partial);

        let items = match region {
            Region::Outer | Region::Lexicons => {
                let before: String = line.chars().take(start).collect();
                let has_bullet = before.trim() == "-";
                let lexicons = self.store.list_lexicons().await.unwrap_or_else(|e| {
                    warn!("Lexicon list unavailable: {}", e);
                    Vec::new()
                });
                complete_lexicons(&lexicons, &partial, has_bullet)
            }
            Region::Query => {
                let schema = resolve_document_schema(
                    snapshot,
                    &regions,
                    &self.store,
                    &self.settings.common_lexicon,
                    self.settings.max_header_lines,
                )
                .await;
                let lines = snapshot.lines();
                let scope = locate_scope(&lines, line_index, self.scope_options());
                debug!("Cursor scope {} with {} schema keys", scope, schema.len());
                complete(&schema, &scope, &partial)
            }
            Region::Tenets => Vec::new(),
        };

        Suggestions { items, replace }
    }

    /// `cursor` is on the line the newline just created.
    pub fn on_newline(&self, snapshot: &DocumentSnapshot, cursor: Position) -> Option<TextEdit> {
        let regions = self.classifier.classify(snapshot);
        assist::on_newline(snapshot, &regions, cursor.line as usize, self.settings.tab_size)
    }

    pub fn on_before_save(&self, snapshot: &DocumentSnapshot) -> Vec<TextEdit> {
        let regions = self.classifier.classify(snapshot);
        assist::on_before_save(
            snapshot,
            &regions,
            self.settings.tab_size,
            self.settings.max_save_lines,
        )
    }

    fn scope_options(&self) -> ScopeOptions {
        ScopeOptions {
            tab_size: self.settings.tab_size,
            max_lookbehind: self.settings.max_lookbehind,
        }
    }
}
