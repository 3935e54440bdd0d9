//! OS signal handling.
//!
//! Translates SIGINT/SIGTERM into the internal shutdown broadcast so the
//! monitor and sweeper loops stop cleanly and axum drains connections.

use tokio::signal;

/// Resolve when the process receives a termination signal.
///
/// Listens for ctrl-c everywhere and additionally SIGTERM on unix, which is
/// what container runtimes send first.
pub async fn wait_for_termination() {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
                let _ = signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
