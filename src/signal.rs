use tracing::{error, info};

/// Resolves on Ctrl-C. If the handler cannot be installed the future never
/// resolves, so the process keeps running until killed.
pub async fn shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(err) => {
            error!("failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await
        }
    }
}
