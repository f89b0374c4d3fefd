//! Startup orchestration.
//!
//! # Responsibilities
//! - Create the shared counter state
//! - Bind the control channel
//! - Register the fast-path handler on the signal line
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Resources are acquired in a fixed order and a failure releases the ones
//!   already held in reverse order before the error is returned

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::KicConfig;
use crate::control::{ChannelError, ControlChannel, ControlDevice};
use crate::counter::CounterRecord;
use crate::irq::{InterruptLine, LineError, SignalHandler};
use crate::service::Service;

/// Fatal errors during startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The control channel could not be registered.
    #[error("control channel setup failed: {0}")]
    Channel(#[from] ChannelError),

    /// The handler could not be registered on the line.
    #[error("signal handler registration failed: {0}")]
    Line(#[from] LineError),
}

/// Acquire every resource the service needs, in order.
pub async fn start<L: InterruptLine>(
    config: &KicConfig,
    line: Arc<L>,
) -> Result<Service<L>, StartupError> {
    let record = Arc::new(CounterRecord::new());
    let device = Arc::new(ControlDevice::new(Arc::clone(&record)));

    let channel = ControlChannel::bind(&config.control).await.map_err(|e| {
        tracing::error!(error = %e, "Registering control channel failed");
        e
    })?;

    let handler = SignalHandler::new(record);
    let registration = match line.request(handler.clone()) {
        Ok(registration) => registration,
        Err(e) => {
            tracing::error!(line = line.name(), error = %e, "Requesting signal handler failed");
            channel.unbind();
            return Err(e.into());
        }
    };
    tracing::info!(line = line.name(), "Signal handler ready");

    Ok(Service::new(
        device,
        channel,
        line,
        handler,
        registration,
        Duration::from_secs(config.shutdown.drain_timeout_secs),
    ))
}
