//! The running counter service.
//!
//! # Responsibilities
//! - Accept control connections and attach a session to each
//! - Stop on the shutdown broadcast
//! - Drain sessions, then release resources in reverse acquisition order

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::control::{connection, ControlChannel, ControlDevice};
use crate::irq::{InterruptLine, SignalHandler};

/// A started service holding the control channel and the line registration.
///
/// Built by [`crate::lifecycle::start`].
pub struct Service<L: InterruptLine> {
    device: Arc<ControlDevice>,
    channel: ControlChannel,
    line: Arc<L>,
    handler: SignalHandler,
    registration: L::Registration,
    drain_timeout: Duration,
}

impl<L: InterruptLine> Service<L> {
    pub(crate) fn new(
        device: Arc<ControlDevice>,
        channel: ControlChannel,
        line: Arc<L>,
        handler: SignalHandler,
        registration: L::Registration,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            device,
            channel,
            line,
            handler,
            registration,
            drain_timeout,
        }
    }

    /// The control device, for in-process callers.
    pub fn device(&self) -> Arc<ControlDevice> {
        Arc::clone(&self.device)
    }

    pub fn socket_path(&self) -> &Path {
        self.channel.path()
    }

    /// Serve clients until `shutdown` fires, then tear down.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            path = %self.channel.path().display(),
            line = self.line.name(),
            "Counter service running"
        );

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                accepted = self.channel.accept() => match accepted {
                    Ok(stream) => {
                        let session = self.device.attach();
                        connections.spawn(async move {
                            let id = session.id();
                            if let Err(e) = connection::serve(stream, session).await {
                                tracing::warn!(session_id = %id, error = %e, "Control connection failed");
                            }
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to accept control connection"),
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Control connection task failed");
                    }
                }
            }
        }

        self.drain(&mut connections).await;
        self.teardown();
    }

    /// Wait for attached sessions to detach, aborting them after the timeout.
    async fn drain(&self, connections: &mut JoinSet<()>) {
        let sessions = self.device.sessions();
        let active = sessions.active_count();
        if active > 0 {
            tracing::info!(active, timeout = ?self.drain_timeout, "Waiting for sessions to detach");
        }

        if tokio::time::timeout(self.drain_timeout, sessions.wait_until_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = sessions.active_count(),
                "Drain timeout elapsed, closing remaining sessions"
            );
            connections.shutdown().await;
        }
    }

    /// Release everything: wait out in-flight deliveries, free the line,
    /// unbind the channel, then drop the state.
    pub fn teardown(self) {
        let Self {
            device,
            channel,
            line,
            handler,
            registration,
            ..
        } = self;

        handler.synchronize();
        line.free(registration);
        tracing::info!(line = line.name(), "Signal handler released");

        channel.unbind();

        let final_count = device.record().count();
        drop(handler);
        drop(device);
        tracing::info!(final_count, "Removal complete");
    }
}
