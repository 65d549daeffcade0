use anyhow::Result;
use axum::Router;
use bucket_browser::{
    config::{AppConfig, StoreBackend},
    routes,
    state::AppState,
    store::{MemoryConnector, S3Connector, StoreConnector},
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-browser with config: {:?}", cfg);

    // --- Pick the store connector ---
    // Credentials are not part of the config; every request brings its own.
    let connector: Arc<dyn StoreConnector> = match cfg.backend {
        StoreBackend::S3 => Arc::new(S3Connector::new(
            cfg.endpoint_url.clone(),
            cfg.force_path_style,
        )),
        StoreBackend::Memory => Arc::new(MemoryConnector::new()),
    };

    // --- Build router ---
    let state = AppState::new(connector, cfg.grant_ttl());
    let app: Router = routes::routes::routes(cfg.max_upload_bytes()).with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
