use clap::Parser;
use messages_bridge::config::config_search_paths;
use messages_bridge::{build_router, AppState, BridgeConfig, SharedLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "messages-bridge",
    about = "Serve the Anthropic Messages API on top of an OpenAI-compatible backend",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PROXY_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Backend base URL, without /v1 (overrides config and OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Append a JSONL journal of every request to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "messages_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = BridgeConfig::find_and_load(cli.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = Some(base_url);
    }

    // Validate config eagerly
    let completions_url = config.completions_url()?;
    if config.resolve_api_key().is_empty() {
        warn!(
            "No API key found in {}; requests will carry an empty bearer token",
            config.backend.api_key_env
        );
    }

    let logger = match cli.log_file {
        Some(ref path) => SharedLogger::new(path)?,
        None => SharedLogger::tracing_only(),
    };

    info!("messages-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("  Backend:   {}", completions_url);
    info!("  Timeout:   {}s", config.backend.timeout_secs);
    info!("  Models:    {} mapped", config.models.len());
    match cli.log_file {
        Some(ref path) => info!("  Journal:   {}", path.display()),
        None => info!("  Journal:   off"),
    }

    logger.info(
        "startup",
        format!(
            "Starting messages-bridge backend={} addr={}",
            completions_url,
            config.bind_addr()
        ),
    );

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, logger)?);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);
    info!("  Point clients at it with ANTHROPIC_BASE_URL=http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
