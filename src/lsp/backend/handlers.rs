//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` trait implementation
//! for the lingo backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Editing assistance (completion, on_type_formatting, will_save_wait_until)

use std::sync::Arc;

use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DocumentOnTypeFormattingOptions,
    DocumentOnTypeFormattingParams, InitializeParams, InitializeResult, InitializedParams,
    MessageType, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextEdit, WillSaveTextDocumentParams,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, info, warn};

use super::state::LingoBackend;
use super::{COMPLETION_TRIGGER_CHARACTERS, to_completion_items};
use crate::lsp::models::{LspDocument, LspDocumentState};

const NEWLINE_TRIGGER: &str = "\n";

#[tower_lsp::async_trait]
impl LanguageServer for LingoBackend {
    /// Handles the LSP initialize request, merging client options and advertising capabilities.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize: {:?}", params);

        if let Some(options) = params.initialization_options.as_ref() {
            self.reconfigure(options).await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        will_save: None,
                        will_save_wait_until: Some(true),
                        save: None,
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        COMPLETION_TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
                    ),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                document_on_type_formatting_provider: Some(DocumentOnTypeFormattingOptions {
                    first_trigger_character: NEWLINE_TRIGGER.to_string(),
                    more_trigger_character: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Handles the LSP initialized notification.
    async fn initialized(&self, params: InitializedParams) {
        info!("Initialized: {:?}", params);
        self.client
            .log_message(MessageType::INFO, "lingo language server initialized")
            .await;
    }

    /// Handles the LSP shutdown request.
    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        info!("Opening document: URI={}, version={}", params.text_document.uri, params.text_document.version);
        let uri = params.text_document.uri;
        let document = Arc::new(LspDocument {
            id: self.next_document_id(),
            state: tokio::sync::RwLock::new(LspDocumentState::new(
                uri.clone(),
                &params.text_document.text,
                params.text_document.version,
            )),
        });
        if self.documents_by_uri.write().await.insert(uri.clone(), document).is_some() {
            debug!("Replaced already open document {}", uri);
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("textDocument/didChange: URI={}, version={}", uri, version);

        let Some(document) = self.document(&uri).await else {
            warn!("Change for unknown document {}", uri);
            return;
        };
        if !document.apply(params.content_changes, version).await {
            warn!(
                "Rejected change for {}: version {} is not newer than {}",
                uri,
                version,
                document.version().await
            );
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        info!("Closing document: URI={}", uri);
        if self.documents_by_uri.write().await.remove(&uri).is_none() {
            debug!("Closed document {} was not open", uri);
        }
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        debug!("Completion request at {}:{:?}", uri, position);

        let Some(document) = self.document(&uri).await else {
            return Ok(None);
        };
        let snapshot = document.snapshot().await;
        let suggestions = self
            .current_hooks()
            .await
            .on_completion_requested(&snapshot, position)
            .await;

        debug!("Returning {} completions for {}", suggestions.items.len(), uri);
        Ok(Some(CompletionResponse::Array(to_completion_items(suggestions))))
    }

    async fn on_type_formatting(
        &self,
        params: DocumentOnTypeFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        if params.ch != NEWLINE_TRIGGER {
            debug!("Ignoring on-type formatting for {:?}", params.ch);
            return Ok(None);
        }
        let Some(document) = self.document(&uri).await else {
            return Ok(None);
        };
        let snapshot = document.snapshot().await;
        let edit = self.current_hooks().await.on_newline(&snapshot, position);

        debug!("Newline at {}:{:?} edit {:?}", uri, position, edit);
        Ok(edit.map(|edit| vec![edit]))
    }

    async fn will_save_wait_until(
        &self,
        params: WillSaveTextDocumentParams,
    ) -> LspResult<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        let Some(document) = self.document(&uri).await else {
            return Ok(None);
        };
        let snapshot = document.snapshot().await;
        let edits = self.current_hooks().await.on_before_save(&snapshot);

        debug!("Normalizing {} lines of {} before save", edits.len(), uri);
        if edits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(edits))
        }
    }
}
