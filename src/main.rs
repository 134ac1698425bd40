use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use varanda::api::ApiClient;
use varanda::config::{Cli, Config};
use varanda::routes;
use varanda::session::SessionStore;
use varanda::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    tracing::info!("Backend: {}", config.backend.base_url);

    let api = ApiClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.timeout_secs),
    )?;
    let sessions = SessionStore::open(config.session_db_path())?;

    let state = AppState {
        api,
        sessions,
        config: config.clone(),
    };

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
