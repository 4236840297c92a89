//! CLQL (lingo) document analyses
//!
//! Leaf first:
//! - `text`: snapshots and single-line grammars
//! - `regions`: which section each line belongs to
//! - `namespace`: alias declarations and the document schema
//! - `scope`: enclosing structural key of a cursor line
//! - `completion`: completion candidates
//! - `assist`: newline and on-save edits
//! - `hooks`: host-facing entry points tying the above together

pub mod assist;
pub mod completion;
pub mod hooks;
pub mod namespace;
pub mod regions;
pub mod scope;
pub mod text;

pub use completion::{Completion, CompletionKind};
pub use hooks::{EditorHooks, HookSettings, Suggestions};
pub use namespace::{AliasDeclaration, DocumentSchema};
pub use regions::{HeaderRegionClassifier, Region, RegionClassifier, Regions};
pub use scope::{CursorScope, ScopeOptions, locate_scope};
pub use text::DocumentSnapshot;
