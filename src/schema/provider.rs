//! Lexicon provider abstraction
//!
//! A provider produces machine-readable lexicon data into a cache file. The
//! production implementation shells out to the `lingo` CLI; tests plug in
//! in-process fakes through the same trait.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::error::{Result, SchemaError};
use crate::config::ProviderConfig;

/// Common interface for all sources of lexicon data
///
/// Both operations must be idempotent and deterministic per identifier, and
/// write JSON to `output`. The parent directory of `output` exists when
/// they are called.
#[async_trait::async_trait]
pub trait LexiconProvider: Send + Sync {
    /// Write the JSON array of every known lexicon identifier to `output`.
    async fn list_lexicons(&self, output: &Path) -> Result<()>;

    /// Write the fact tree of `lexicon` to `output`.
    async fn list_facts(&self, lexicon: &str, output: &Path) -> Result<()>;

    /// Get a human-readable name for this provider (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Provider backed by the `lingo` command-line tool
///
/// Runs `lingo list-lexicons -f json -o <output>` and
/// `lingo list-facts <lexicon> -f json -o <output>` with the configured
/// profile and search path applied to the child process only.
#[derive(Debug, Clone)]
pub struct LingoCliProvider {
    config: ProviderConfig,
}

impl LingoCliProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    /// `PATH` for the child: configured search paths first, then the
    /// inherited `PATH`.
    fn child_path(&self) -> Option<OsString> {
        if self.config.search_paths.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let paths = self
            .config
            .search_paths
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        std::env::join_paths(paths).ok()
    }

    fn command(&self, args: &[&str], output: &Path) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .args(args)
            .arg("-f")
            .arg("json")
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.child_path() {
            command.env("PATH", path);
        }
        if let Some(profile) = &self.config.env_profile {
            command.env("CODELINGO_ENV", profile);
        }
        command
    }

    async fn run(&self, args: &[&str], output: &Path) -> Result<()> {
        let description = format!("{} {}", self.config.executable.display(), args.join(" "));
        debug!("Invoking lexicon provider: {}", description);

        let child = self
            .command(args, output)
            .spawn()
            .map_err(|e| SchemaError::provider(&description, e.to_string()))?;

        let timeout = self.config.timeout();
        let result = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                // The child is dropped with the future and killed by kill_on_drop.
                return Err(SchemaError::provider(
                    &description,
                    format!("timed out after {}s", timeout.as_secs()),
                ));
            }
        };
        let out = result.map_err(|e| SchemaError::provider(&description, e.to_string()))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(SchemaError::provider(
                &description,
                format!("exited with {}: {}", out.status, stderr.trim()),
            ));
        }

        info!("Lexicon provider wrote {}", output.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl LexiconProvider for LingoCliProvider {
    async fn list_lexicons(&self, output: &Path) -> Result<()> {
        self.run(&["list-lexicons"], output).await
    }

    async fn list_facts(&self, lexicon: &str, output: &Path) -> Result<()> {
        self.run(&["list-facts", lexicon], output).await
    }

    fn provider_name(&self) -> &'static str {
        "lingo-cli"
    }
}
