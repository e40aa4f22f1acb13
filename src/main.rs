use simresponses::{api, config::Config, ResponseStore};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Schema must exist before the first request is accepted
    let store = Arc::new(ResponseStore::from_config(&config));
    if let Err(e) = store.ensure_schema().await {
        tracing::error!("Failed to initialize database: {}", e);
        std::process::exit(1);
    }

    let port = config.port;
    let app = api::create_router(api::AppState::new(store, config));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server startup error: {}", e);
        std::process::exit(1);
    }
}
