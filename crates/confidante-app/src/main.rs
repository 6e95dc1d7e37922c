//! Confidante server binary - composition root.
//!
//! 1. Parse CLI and load configuration from TOML
//! 2. Load the dialogue graph and post catalog (embedded or from disk)
//! 3. Lint the dialogue graph for dead links
//! 4. Serve the HTTP API until ctrl-c, then close open chat sessions

mod cli;

use std::path::Path;

use clap::Parser;

use confidante_api::{serve_until, AppState};
use confidante_blog::PostCatalog;
use confidante_core::config::ConfidanteConfig;
use confidante_dialogue::DialogueGraph;

use cli::CliArgs;

fn load_graph(config: &ConfidanteConfig) -> Result<DialogueGraph, confidante_dialogue::DialogueError> {
    match config.chat.dialogue_path.as_deref() {
        Some(path) => DialogueGraph::load(Path::new(path)),
        None => DialogueGraph::embedded(),
    }
}

fn load_catalog(config: &ConfidanteConfig) -> Result<PostCatalog, confidante_blog::BlogError> {
    match config.blog.posts_path.as_deref() {
        Some(path) => PostCatalog::load(Path::new(path)),
        None => PostCatalog::embedded(),
    }
}

/// Log every option label that leads nowhere. Returns how many there were.
fn report_dead_links(graph: &DialogueGraph) -> usize {
    let dead = graph.lint();
    for link in &dead {
        tracing::warn!(
            from = link.from.as_deref().unwrap_or("<menu>"),
            option = %link.option,
            "Dialogue option has no node; it will resolve to the fallback reply"
        );
    }
    dead.len()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        return;
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Read config before tracing so the configured level applies; report afterwards.
    let config_file = args.resolve_config_path();
    let loaded = config_file
        .exists()
        .then(|| ConfidanteConfig::load(&config_file));
    let config_level = match &loaded {
        Some(Ok(config)) => config.general.log_level.clone(),
        _ => "info".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(args.resolve_log_level(&config_level))
                }),
        )
        .init();

    tracing::info!("Starting Confidante v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Some(Ok(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Some(Err(e)) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config file, using defaults");
            ConfidanteConfig::default()
        }
        None => {
            tracing::info!(path = %config_file.display(), "No config file, using defaults");
            ConfidanteConfig::default()
        }
    };
    config.server.port = args.resolve_port(config.server.port);
    config.server.host = args.resolve_host(&config.server.host);

    // Content.
    let graph = load_graph(&config)?;
    tracing::info!(
        nodes = graph.len(),
        initial_options = graph.initial_options().len(),
        "Dialogue graph ready"
    );
    let dead_links = report_dead_links(&graph);
    if dead_links > 0 {
        tracing::warn!(dead_links, "Dialogue graph has options without nodes");
    }

    let catalog = load_catalog(&config)?;
    tracing::info!(
        posts = catalog.len(),
        categories = catalog.list_categories().len(),
        "Post catalog ready"
    );

    if args.check {
        tracing::info!(dead_links, "Content check finished");
        return Ok(());
    }

    // === API server ===

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, graph, catalog);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind - is another instance running?");
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    serve_until(listener, state, shutdown_signal()).await?;
    tracing::info!("Confidante stopped");

    Ok(())
}
