//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build state → Bind control channel → Request signal line
//!     (failure at any step unwinds the earlier steps in reverse)
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain sessions → Synchronize handler
//!         → Free line → Unbind channel
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGQUIT → Trigger graceful shutdown
//!     SIGINT is the counted line and never stops the daemon
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, StartupError};
