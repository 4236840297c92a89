use ropey::Rope;

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::lingo::DocumentSnapshot;

pub use crate::lsp::models::{LspDocument, LspDocumentState};

/// Converts an LSP position to a char offset in the Rope.
///
/// `character` counts UTF-16 code units. Positions past the end of a line
/// clamp to the end of its content, before the line terminator; positions
/// past the last line clamp to the end of the text.
fn position_to_char_offset(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let slice = text.line(line);
    let mut content_len = slice.len_chars();
    while content_len > 0 && matches!(slice.char(content_len - 1), '\n' | '\r') {
        content_len -= 1;
    }
    let character = (position.character as usize).min(slice.char_to_utf16_cu(content_len));
    text.line_to_char(line) + slice.utf16_cu_to_char(character)
}

impl LspDocumentState {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        Self {
            uri,
            text: Rope::from_str(text),
            version,
        }
    }

    /// Applies a list of content changes to the document state.
    /// Fails without touching the text if the version is not newer.
    pub fn apply(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Result<(), String> {
        if version <= self.version {
            return Err(format!("Version {} not newer than {}", version, self.version));
        }
        for change in changes {
            if let Some(range) = change.range {
                let start = position_to_char_offset(&range.start, &self.text);
                let end = position_to_char_offset(&range.end, &self.text).max(start);
                self.text.remove(start..end);
                self.text.insert(start, &change.text);
            } else {
                self.text = Rope::from_str(&change.text);
            }
        }
        self.version = version;
        Ok(())
    }
}

impl LspDocument {
    /// Returns the current text of the document as a string.
    pub async fn text(&self) -> String {
        self.state.read().await.text.to_string()
    }

    /// Returns the current version of the document.
    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    /// Immutable view of the current text; cloning a Rope is cheap.
    pub async fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.state.read().await.text.clone())
    }

    /// Applies changes to the document, returning whether they were accepted.
    pub async fn apply(
        &self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> bool {
        let mut state = self.state.write().await;
        state.apply(changes, version).is_ok()
    }
}
