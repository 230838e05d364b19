//! Runtime - shutdown signal for the HTTP server

/// Resolves on SIGTERM or SIGINT (Ctrl+C elsewhere). Pass to
/// `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                    _ = sigint.recv() => tracing::info!("Received SIGINT"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => tracing::warn!(error = %e, "signal handlers unavailable, falling back to Ctrl+C"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl+C; shutdown only by kill");
            std::future::pending::<()>().await;
        }
    }
}
