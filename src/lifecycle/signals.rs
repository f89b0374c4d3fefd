//! OS signal handling for the daemon itself.
//!
//! # Responsibilities
//! - Turn SIGTERM and SIGQUIT into a graceful shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGINT is not listened to here: it is the counted line, and Tokio
//!   would otherwise treat Ctrl-C as a stop request

use tokio::signal::unix::{signal, SignalKind};

use crate::lifecycle::Shutdown;

/// Wait for a termination signal, then trigger `shutdown`.
pub async fn listen(shutdown: Shutdown) -> std::io::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = term.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };

    tracing::info!(signal = name, "Shutdown signal received");
    shutdown.trigger();
    Ok(())
}
