//! Lexicon schema resolution
//!
//! - `store`: two-level on-disk cache (lexicon list, per-lexicon fact trees)
//! - `provider`: source of cache contents, the `lingo` CLI in production

pub mod error;
pub mod provider;
pub mod store;

pub use error::{Result, SchemaError};
pub use provider::{LexiconProvider, LingoCliProvider};
pub use store::{SchemaNode, SchemaStore};
