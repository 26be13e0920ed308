//! ko-hover: Korean translation of English identifiers and comments for code
//! editors, on hover and on demand.
//! Main library: pipeline wiring, logging setup, host loop entry point.

pub mod commands;
pub mod config;
pub mod debounce;
pub mod host;
pub mod hover;
pub mod inline;
pub mod span;
pub mod translate;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use commands::Commands;
use config::Config;
use hover::HoverProvider;
use inline::InlineTranslator;
use translate::cache::TranslationCache;
use translate::deepl::DeepLClient;
use translate::{TranslationBackend, TranslationService};

/// Everything a request handler needs. Built once at startup; the cache and
/// the debounce state live here for the life of the process.
pub struct AppContext<B> {
    pub translator: Arc<TranslationService<B>>,
    pub hover: HoverProvider<B>,
    pub inline: InlineTranslator<B>,
    pub commands: Commands<B>,
}

impl<B: TranslationBackend> AppContext<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        let cache = TranslationCache::new(config.cache_capacity);
        let translator = Arc::new(TranslationService::new(backend, cache));
        let enabled = Arc::new(AtomicBool::new(config.enabled));

        Self {
            hover: HoverProvider::new(Arc::clone(&translator), Arc::clone(&enabled), config),
            inline: InlineTranslator::new(Arc::clone(&translator), config),
            commands: Commands::new(Arc::clone(&translator), enabled),
            translator,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ko_hover=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    // stdout carries the host protocol, so logs always go to stderr.
    if std::env::var_os("KO_HOVER_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[derive(Debug, Parser)]
#[command(name = "ko-hover", about = "Korean hover translation for code editors, served over stdio")]
pub struct Args {
    /// JSON config file (defaults to ./ko-hover.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load configuration, build the pipeline and serve stdin until EOF.
pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("ko-hover starting");

    let config = Config::load(args.config.as_deref())?;
    let client = DeepLClient::new(&config)?;
    if !client.is_configured() {
        info!("no DeepL API key configured, translations will report it");
    }

    let ctx = Arc::new(AppContext::new(client, &config));
    ctx.translator.clear_cache();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        host::serve(Arc::clone(&ctx), stdin, tokio::io::stdout()).await
    })?;

    info!("ko-hover stopped");
    Ok(())
}

/// Binary entry point: run and log a fatal error instead of panicking.
/// Usage errors and `--help` exit through clap before anything starts.
pub fn main_entry() -> std::process::ExitCode {
    match run(Args::parse()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "ko-hover failed");
            std::process::ExitCode::FAILURE
        }
    }
}
