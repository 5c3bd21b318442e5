//! # Shutdown triggers.
//!
//! The notifier stops on whichever comes first:
//! - a termination signal (see below)
//! - cancellation of the token returned by `Notifier::shutdown_token`
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use tokio_util::sync::CancellationToken;

/// Completes on a termination signal or when `token` is cancelled.
///
/// Returns `Err` if signal registration fails.
pub(crate) async fn shutdown_requested(token: &CancellationToken) -> std::io::Result<()> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Ok(()),
        res = wait_for_signal() => res,
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => tracing::info!("received SIGINT"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        _ = sigquit.recv() => tracing::info!("received SIGQUIT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl-C");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_triggers_shutdown() {
        let token = CancellationToken::new();
        token.cancel();
        shutdown_requested(&token).await.unwrap();
    }
}
