//! # Termination signals.
//!
//! [`wait_for_shutdown_signal`] completes on the first of `SIGINT`, `SIGTERM`
//! or `SIGQUIT` (Unix) or on Ctrl-C (elsewhere). The table treats it as an
//! interruption: philosophers are cancelled, forks are returned, the session
//! ends with `StopReason::Interrupted`.

/// Waits for a termination signal.
///
/// Returns `Err` if a listener cannot be registered; the table then keeps
/// running without signal handling.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    tracing::debug!(signal = name, "termination signal received");
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::debug!(signal = "ctrl-c", "termination signal received");
    Ok(())
}
