//! Signal line subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     SignalHandler::new(record) → InterruptLine::request → Registration
//!
//! Event (restricted context):
//!     platform → handler.rs handle() → CounterRecord::increment → Verdict
//!
//! Teardown:
//!     handler.synchronize() → InterruptLine::free(registration)
//! ```
//!
//! # Design Decisions
//! - The line is shared: other consumers of the same line keep working
//! - The handler only touches atomics (no allocation, locking or logging)
//! - Teardown drains in-flight deliveries before freeing the registration

pub mod handler;
pub mod signal;
pub mod simulated;

pub use handler::{SignalHandler, Verdict};
pub use signal::SignalLine;
pub use simulated::SimulatedLine;

use thiserror::Error;

/// Errors raised while requesting a line.
#[derive(Debug, Error)]
pub enum LineError {
    /// The line refused another handler.
    #[error("line {0} is busy")]
    Busy(&'static str),

    /// The platform rejected the registration.
    #[error("failed to register handler on {line}: {source}")]
    Register {
        line: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A platform interrupt-delivery mechanism for one fixed line.
pub trait InterruptLine: Send + Sync + 'static {
    /// Handle returned by `request`, consumed by `free`.
    type Registration: Send + Sync + 'static;

    /// Human-readable name of the line, for logs.
    fn name(&self) -> &'static str;

    /// Register `handler` so it runs on every event on this line.
    fn request(&self, handler: SignalHandler) -> Result<Self::Registration, LineError>;

    /// Remove a registration. No new deliveries reach the handler afterwards.
    fn free(&self, registration: Self::Registration);
}
