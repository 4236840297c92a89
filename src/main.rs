use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;

use lingo_language_server::config::LingoConfig;
use lingo_language_server::logging::init_logger;
use lingo_language_server::lsp::backend::LingoBackend;

#[derive(Parser, Debug)]
#[command(
    name = "lingo-language-server",
    version,
    about = "Completion and indentation assistance for CLQL (lingo) documents"
)]
struct Cli {
    /// Disable ANSI colors in stderr logs
    #[arg(long)]
    no_color: bool,
    /// Log filter for stderr (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
    /// Do not write a session log under the user cache directory
    #[arg(long)]
    no_file_logging: bool,
    /// Profile passed to the lingo tool as CODELINGO_ENV
    #[arg(long = "env")]
    env_profile: Option<String>,
    /// Executable name or path of the lingo tool
    #[arg(long)]
    lingo: Option<PathBuf>,
    /// Directory prepended to the lingo tool's PATH (repeatable)
    #[arg(long = "search-path")]
    search_paths: Vec<PathBuf>,
    /// Root of the lexicon cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Seconds to wait for a lingo invocation
    #[arg(long)]
    provider_timeout: Option<u64>,
    /// Columns per tab stop
    #[arg(long)]
    tab_size: Option<usize>,
    /// Communicate over stdin/stdout (the only transport; accepted for client compatibility)
    #[arg(long)]
    stdio: bool,
}

impl Cli {
    /// Overlay command-line flags on `config`.
    fn apply(&self, config: &mut LingoConfig) {
        if let Some(profile) = &self.env_profile {
            config.provider.env_profile = Some(profile.clone());
        }
        if let Some(lingo) = &self.lingo {
            config.provider.executable = lingo.clone();
        }
        config.provider.search_paths.extend(self.search_paths.iter().cloned());
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(secs) = self.provider_timeout {
            config.provider.timeout_secs = secs;
        }
        if let Some(tab_size) = self.tab_size.filter(|&n| n > 0) {
            config.tab_size = tab_size;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), !cli.no_file_logging)
        .context("Failed to initialize logging")?;

    let mut config = LingoConfig::from_env();
    cli.apply(&mut config);
    info!("Starting lingo-language-server {}", env!("CARGO_PKG_VERSION"));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| LingoBackend::new(client, config));
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("lingo-language-server exited");
    Ok(())
}
