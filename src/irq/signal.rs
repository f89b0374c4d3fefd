//! The keyboard interrupt line: SIGINT delivered to this process.
//!
//! Registration goes through `signal-hook`'s shared registry, which chains
//! every action registered for a signal. Other consumers of SIGINT in the
//! same process (including Tokio's signal driver) keep receiving it.

use signal_hook::consts::SIGINT;
use signal_hook::low_level;
use signal_hook::SigId;
use std::os::raw::c_int;

use super::{InterruptLine, LineError, SignalHandler};

/// Real signal line.
#[derive(Debug)]
pub struct SignalLine {
    signal: c_int,
    name: &'static str,
}

impl SignalLine {
    /// The keyboard interrupt line (SIGINT).
    pub fn keyboard() -> Self {
        Self {
            signal: SIGINT,
            name: "SIGINT",
        }
    }
}

impl InterruptLine for SignalLine {
    type Registration = SigId;

    fn name(&self) -> &'static str {
        self.name
    }

    fn request(&self, handler: SignalHandler) -> Result<SigId, LineError> {
        // SAFETY: the action only calls `SignalHandler::handle`, which performs
        // atomic operations and nothing else, so it is async-signal-safe.
        let id = unsafe {
            low_level::register(self.signal, move || {
                handler.handle();
            })
        }
        .map_err(|source| LineError::Register {
            line: self.name,
            source,
        })?;

        tracing::debug!(line = self.name, "Signal action registered");
        Ok(id)
    }

    fn free(&self, registration: SigId) {
        if !low_level::unregister(registration) {
            tracing::warn!(line = self.name, "Signal action was already removed");
        }
    }
}
