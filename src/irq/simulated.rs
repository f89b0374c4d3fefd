//! In-process interrupt line.
//!
//! Stands in for the platform when there is no real hardware or signal to
//! drive the counter, e.g. in tests or when embedding the service. Events are
//! raised explicitly with [`SimulatedLine::fire`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::{InterruptLine, LineError, SignalHandler, Verdict};

/// Opaque registration on a [`SimulatedLine`].
#[derive(Debug, PartialEq, Eq)]
pub struct SimulatedRegistration(u64);

/// A shareable line whose events are raised by the caller.
#[derive(Debug, Default)]
pub struct SimulatedLine {
    handlers: Mutex<Vec<(u64, SignalHandler)>>,
    next_id: AtomicU64,
    refuse: AtomicBool,
}

impl SimulatedLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line that rejects every `request` as busy.
    pub fn refusing() -> Self {
        let line = Self::new();
        line.refuse.store(true, Ordering::SeqCst);
        line
    }

    /// Deliver one event to every registered handler.
    ///
    /// Returns the number of handlers that reported [`Verdict::Handled`].
    pub fn fire(&self) -> usize {
        let handlers = self.handlers.lock().expect("simulated line mutex poisoned");
        handlers
            .iter()
            .filter(|(_, h)| h.handle() == Verdict::Handled)
            .count()
    }

    /// Deliver `n` events.
    pub fn fire_n(&self, n: usize) {
        for _ in 0..n {
            self.fire();
        }
    }

    /// Number of handlers currently registered.
    pub fn registered(&self) -> usize {
        self.handlers.lock().expect("simulated line mutex poisoned").len()
    }
}

impl InterruptLine for SimulatedLine {
    type Registration = SimulatedRegistration;

    fn name(&self) -> &'static str {
        "simulated"
    }

    fn request(&self, handler: SignalHandler) -> Result<SimulatedRegistration, LineError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(LineError::Busy(self.name()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .expect("simulated line mutex poisoned")
            .push((id, handler));
        Ok(SimulatedRegistration(id))
    }

    fn free(&self, registration: SimulatedRegistration) {
        // Taking the lock also waits out any `fire` currently delivering.
        self.handlers
            .lock()
            .expect("simulated line mutex poisoned")
            .retain(|(id, _)| *id != registration.0);
    }
}
