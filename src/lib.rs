pub mod config;
pub mod lingo;
pub mod logging;
pub mod lsp;
pub mod schema;
