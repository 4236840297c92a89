//! Backend state management
//!
//! This module defines the LingoBackend struct, which holds the open
//! documents, the effective configuration and the editor hooks built from it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::config::LingoConfig;
use crate::lingo::EditorHooks;
use crate::lsp::models::LspDocument;

/// The lingo language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct LingoBackend {
    pub(super) client: Client,
    pub(super) documents_by_uri: Arc<RwLock<HashMap<Url, Arc<LspDocument>>>>,
    pub(super) serial_document_id: Arc<AtomicU32>,
    pub(super) config: Arc<RwLock<LingoConfig>>,
    /// Rebuilt when `initializationOptions` change the configuration.
    pub(super) hooks: Arc<RwLock<Arc<EditorHooks>>>,
}

impl std::fmt::Debug for LingoBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LingoBackend")
            .field("documents_count", &"<HashMap>")
            .field("config", &"<LingoConfig>")
            .finish()
    }
}
