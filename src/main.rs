use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

mod controllers;
mod error;
mod handlers;
mod models;
mod services;
mod ui;
mod utils;

use handlers::session::SessionStore;
use handlers::{create_app, AppState};
use models::config::AppConfig;
use services::api_client::HttpPortalApi;
use utils::logging::init_logging;

const SESSION_IDLE: Duration = Duration::from_secs(2 * 60 * 60);
const SESSION_SWEEP: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration comes first: it tells logging where to write
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let _log_guard = init_logging(&config.logging)?;
    info!("Starting Crime Portal v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        Some(e) => warn!("Configuration error, using defaults: {}", e),
        None => info!("Configuration loaded successfully"),
    }

    let api = Arc::new(HttpPortalApi::new(&config.api)?);
    let state = AppState::new(config.clone(), api)?;

    if let Err(e) = state.charts.ensure_folder().await {
        warn!("Could not create charts folder: {}", e);
    }
    info!("Charts folder: {}", state.charts.folder().display());
    info!("Reports file: {}", state.reports.path().display());

    // Forget idle browser sessions
    let sessions = Arc::clone(&state.sessions);
    tokio::spawn(async move {
        session_prune_loop(sessions).await;
    });

    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn session_prune_loop(sessions: Arc<SessionStore>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP);

    loop {
        interval.tick().await;

        let removed = sessions.prune(SESSION_IDLE);
        if removed > 0 {
            debug!("Pruned {} idle sessions, {} remain", removed, sessions.len());
        }
    }
}
