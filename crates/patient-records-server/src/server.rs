//! Server lifecycle: open the store, bind, serve until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use patient_records_core::{JsonFileStore, PatientRegistry};
use tokio::net::TcpListener;

use crate::api::{patient_api_router, DynStore, SharedRegistry};
use crate::config::ServerConfig;

/// Open the record document named by the config, creating it if missing.
pub fn open_registry(config: &ServerConfig) -> anyhow::Result<SharedRegistry> {
    let store = JsonFileStore::open(&config.store_path).with_context(|| {
        format!(
            "Failed to open record document {}",
            config.store_path.display()
        )
    })?;
    let store: DynStore = Box::new(store);
    Ok(Arc::new(PatientRegistry::new(store)))
}

/// Run the server until Ctrl-C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let registry = open_registry(&config)?;
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    serve(listener, registry, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    registry: SharedRegistry,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "Patient records server listening");

    axum::serve(listener, patient_api_router(registry))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    tracing::info!("Patient records server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
