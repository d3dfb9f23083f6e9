use tokio::sync::oneshot;

/// Install a shutdown handler that listens for SIGTERM and SIGINT.
///
/// The signal handlers are registered before this returns, so a signal that
/// arrives while the first pass is still running is not lost. The returned
/// receiver resolves once either signal is received.
#[cfg(unix)]
pub fn install_shutdown_handler() -> std::io::Result<oneshot::Receiver<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, finishing current pass");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, finishing current pass");
            }
        }

        let _ = tx.send(());
    });

    Ok(rx)
}

#[cfg(not(unix))]
pub fn install_shutdown_handler() -> std::io::Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, finishing current pass");
                let _ = tx.send(());
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                // Keep the sender alive so the worker does not stop on its own.
                std::future::pending::<()>().await;
                drop(tx);
            }
        }
    });

    Ok(rx)
}
