//! Server configuration
//!
//! Configuration is layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. Environment variables (`CODELINGO_ENV`, `LINGO_EXECUTABLE`,
//!    `LINGO_SEARCH_PATH`, `LINGO_CACHE_DIR`)
//! 3. Command-line flags
//! 4. LSP `initializationOptions`
//!
//! Nothing here mutates the process environment; the provider receives its
//! profile and search path explicitly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lexicon imported into every document without a namespace prefix.
pub const DEFAULT_COMMON_LEXICON: &str = "codelingo/common";

/// Upper bound on header lines scanned for alias declarations.
pub const DEFAULT_MAX_HEADER_LINES: usize = 50;

/// Upper bound on lines the scope locator walks back from the cursor.
pub const DEFAULT_MAX_LOOKBEHIND: usize = 1000;

/// Upper bound on lines visited by the on-save normalization pass.
pub const DEFAULT_MAX_SAVE_LINES: usize = 10_000;

pub const DEFAULT_TAB_SIZE: usize = 4;

pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// How to invoke the external `lingo` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Executable name or path of the provider.
    pub executable: PathBuf,
    /// Directories prepended to the provider's `PATH`.
    pub search_paths: Vec<PathBuf>,
    /// Profile passed to the provider as `CODELINGO_ENV`.
    pub env_profile: Option<String>,
    /// Seconds a provider run may take; zero is treated as one.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("lingo"),
            search_paths: Vec::new(),
            env_profile: None,
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Complete configuration of the language server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LingoConfig {
    pub provider: ProviderConfig,
    pub cache_dir: PathBuf,
    pub common_lexicon: String,
    pub tab_size: usize,
    pub max_header_lines: usize,
    pub max_lookbehind: usize,
    pub max_save_lines: usize,
    /// Delete and re-fetch a cache file that fails to parse.
    pub repair_cache: bool,
}

impl Default for LingoConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            cache_dir: default_cache_dir(),
            common_lexicon: DEFAULT_COMMON_LEXICON.to_string(),
            tab_size: DEFAULT_TAB_SIZE,
            max_header_lines: DEFAULT_MAX_HEADER_LINES,
            max_lookbehind: DEFAULT_MAX_LOOKBEHIND,
            max_save_lines: DEFAULT_MAX_SAVE_LINES,
            repair_cache: true,
        }
    }
}

/// Get the lexicon cache directory in the user-specific OS cache directory
/// - Linux: ~/.cache/codelingo/lingo-language-server/
/// - macOS: ~/Library/Caches/codelingo/lingo-language-server/
/// - Windows: %LOCALAPPDATA%\codelingo\lingo-language-server\
///
/// Falls back to a relative `.lingo-cache` when no cache directory is known.
pub fn default_cache_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(mut dir) => {
            dir.push("codelingo");
            dir.push("lingo-language-server");
            dir
        }
        None => PathBuf::from(".lingo-cache"),
    }
}

impl LingoConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from an environment lookup.
    ///
    /// The lookup is injected so tests never touch the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(profile) = lookup("CODELINGO_ENV").filter(|s| !s.trim().is_empty()) {
            self.provider.env_profile = Some(profile.trim().to_string());
        }
        if let Some(executable) = lookup("LINGO_EXECUTABLE").filter(|s| !s.is_empty()) {
            self.provider.executable = PathBuf::from(executable);
        }
        if let Some(paths) = lookup("LINGO_SEARCH_PATH") {
            self.provider
                .search_paths
                .extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(dir) = lookup("LINGO_CACHE_DIR").filter(|s| !s.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
    }

    /// Merge LSP `initializationOptions` field by field.
    ///
    /// Only keys present in `options` override the current values; options
    /// that are not a JSON object, or that fail to deserialize, are ignored.
    pub fn merge_initialization_options(&mut self, options: &serde_json::Value) {
        let Some(map) = options.as_object() else {
            if !options.is_null() {
                warn!("Ignoring non-object initializationOptions: {}", options);
            }
            return;
        };

        let mut merged = match serde_json::to_value(&*self) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize current configuration: {}", e);
                return;
            }
        };
        merge_json(&mut merged, &serde_json::Value::Object(map.clone()));

        match serde_json::from_value::<LingoConfig>(merged) {
            Ok(config) => *self = config,
            Err(e) => warn!("Ignoring invalid initializationOptions: {}", e),
        }
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
