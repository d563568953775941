use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relation_tuples_server::config::{LogConfig, LogFormat};
use relation_tuples_server::{create_app, RelationTupleServer, ServerConfig};

/// Relation tuple read API server
#[derive(Parser, Debug)]
#[command(name = "relation-tuples-server")]
#[command(about = "Serves relation tuple queries with fan-out and bounded expansion")]
struct Args {
    /// Server bind address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tuple seed file loaded into the in-memory store
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(seed) = args.seed {
        config.seed.file = Some(seed);
    }
    if args.verbose {
        config.log.level = "debug".to_string();
    }
    config.validate()?;

    init_tracing(&config.log)?;

    info!("Starting relation tuple server");
    info!(version = env!("CARGO_PKG_VERSION"), "Version");
    info!(
        default_page_size = config.read.default_page_size,
        expansion_rounds = config.read.expansion_rounds,
        "Read policy"
    );

    let addr = config.bind_address();
    let server = RelationTupleServer::from_config(config)?;
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {addr}: {e}"))?;

    info!("Relation tuple server running on http://{addr}");
    info!("Health check available at: http://{addr}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {e}"))?;

    info!("Relation tuple server stopped");
    Ok(())
}

fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "relation_tuples={level},relation_tuples_server={level},tower_http={level}",
            level = log.level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    match log.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?,
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}
