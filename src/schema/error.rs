use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors produced while resolving lexicon schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The external provider could not be spawned, exited non-zero, timed
    /// out, or exited cleanly without writing the requested cache file.
    #[error("lexicon provider unavailable ({command}): {reason}")]
    ProviderUnavailable { command: String, reason: String },

    #[error("malformed cache file {path}: {message}")]
    MalformedCache { path: PathBuf, message: String },

    #[error("invalid lexicon identifier {identifier:?}")]
    InvalidIdentifier { identifier: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn provider(command: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::ProviderUnavailable {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn is_malformed_cache(&self) -> bool {
        matches!(self, SchemaError::MalformedCache { .. })
    }
}
