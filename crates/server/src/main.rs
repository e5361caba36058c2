mod api;
mod metrics;
mod state;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scout_core::config::{load_config, validate_config, CorpusKind};
use scout_core::corpus::{CorpusClient, CqlClient, JqlClient};
use scout_core::keywords::{FallbackExtractor, KeywordExtractor};
use scout_core::pipeline::SearchPipeline;

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Configured corpora: {}", config.corpora.len());

    // Create a client for each corpus that has an HTTP backend
    let mut clients: HashMap<String, Arc<dyn CorpusClient>> = HashMap::new();
    for corpus in &config.corpora {
        let Some(http) = &corpus.http else {
            warn!(corpus = %corpus.id, "No HTTP backend configured, corpus will be skipped");
            continue;
        };
        let client: Arc<dyn CorpusClient> = match corpus.kind {
            CorpusKind::Documents => {
                info!(corpus = %corpus.id, url = %http.url, "Initializing CQL client");
                Arc::new(
                    CqlClient::new(http.clone())
                        .with_context(|| format!("Failed to create client for {}", corpus.id))?,
                )
            }
            CorpusKind::Tickets => {
                info!(corpus = %corpus.id, url = %http.url, "Initializing JQL client");
                Arc::new(
                    JqlClient::new(http.clone())
                        .with_context(|| format!("Failed to create client for {}", corpus.id))?,
                )
            }
        };
        clients.insert(corpus.id.clone(), client);
    }

    // Keyword extraction runs on the built-in heuristics
    let extractor: Arc<dyn KeywordExtractor> = Arc::new(FallbackExtractor::new());
    info!("Using keyword extractor: {}", extractor.name());

    let pipeline = Arc::new(SearchPipeline::new(config.clone(), extractor, clients));

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), pipeline));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
