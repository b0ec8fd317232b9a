mod config;
mod routes;
mod services;
mod state;

use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // A missing .env file is normal; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::RelayConfig::from_env();
    let state = state::AppState::new(config.client_queue_capacity);

    let static_dir = config.static_dir_if_present();
    if static_dir.is_none() {
        warn!(dir = %config.static_dir.display(), "static dir not found; serving websocket only");
    }

    let app = routes::app(state, static_dir);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;

    info!(%addr, queue = config.client_queue_capacity, "paint relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
