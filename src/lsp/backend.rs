use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::RwLock;

use tower_lsp::Client;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, Range, TextEdit, Url,
};

use tracing::{debug, info};

use crate::config::LingoConfig;
use crate::lingo::{Completion, CompletionKind, EditorHooks, Suggestions};
use crate::lsp::models::LspDocument;

mod handlers;
mod state;

pub use state::LingoBackend;

/// Characters that re-trigger completion while typing a fact path or lexicon.
pub const COMPLETION_TRIGGER_CHARACTERS: [&str; 4] = [".", "-", " ", "/"];

impl LingoBackend {
    /// Creates a backend whose hooks are built from `config`.
    ///
    /// The configuration may still be refined by the client's
    /// `initializationOptions` during `initialize`.
    pub fn new(client: Client, config: LingoConfig) -> Self {
        info!("Lexicon cache at {}", config.cache_dir.display());
        let hooks = Arc::new(EditorHooks::from_config(&config));
        Self {
            client,
            documents_by_uri: Arc::new(RwLock::new(HashMap::new())),
            serial_document_id: Arc::new(AtomicU32::new(0)),
            config: Arc::new(RwLock::new(config)),
            hooks: Arc::new(RwLock::new(hooks)),
        }
    }

    fn next_document_id(&self) -> u32 {
        self.serial_document_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn document(&self, uri: &Url) -> Option<Arc<LspDocument>> {
        let document = self.documents_by_uri.read().await.get(uri).cloned();
        if document.is_none() {
            debug!("Document not found: {}", uri);
        }
        document
    }

    async fn current_hooks(&self) -> Arc<EditorHooks> {
        self.hooks.read().await.clone()
    }

    /// Applies `options` on top of the current configuration and rebuilds the hooks.
    async fn reconfigure(&self, options: &serde_json::Value) {
        let mut config = self.config.write().await;
        config.merge_initialization_options(options);
        info!(
            "Using lingo executable {} with cache at {}",
            config.provider.executable.display(),
            config.cache_dir.display()
        );
        *self.hooks.write().await = Arc::new(EditorHooks::from_config(&config));
    }
}

fn completion_item_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Fact => CompletionItemKind::MODULE,
        CompletionKind::Property => CompletionItemKind::PROPERTY,
        CompletionKind::Lexicon => CompletionItemKind::FOLDER,
        CompletionKind::Keyword => CompletionItemKind::KEYWORD,
    }
}

fn to_completion_item(index: usize, completion: Completion, replace: Range) -> CompletionItem {
    CompletionItem {
        label: completion.label.clone(),
        kind: Some(completion_item_kind(completion.kind)),
        detail: Some(completion.kind.label().to_string()),
        // Keep the engine's order; clients sort by sort_text.
        sort_text: Some(format!("{:05}", index)),
        filter_text: Some(completion.label),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: replace,
            new_text: completion.insert_text,
        })),
        ..Default::default()
    }
}

/// Converts engine suggestions into LSP completion items.
pub(crate) fn to_completion_items(suggestions: Suggestions) -> Vec<CompletionItem> {
    let Suggestions { items, replace } = suggestions;
    items
        .into_iter()
        .enumerate()
        .map(|(index, completion)| to_completion_item(index, completion, replace))
        .collect()
}
