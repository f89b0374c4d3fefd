//! Fast-path signal handler.
//!
//! # Responsibilities
//! - Count one event per delivery
//! - Track deliveries in flight so teardown can drain them
//!
//! # Design Decisions
//! - `handle` runs in a restricted context (signal handler): it must not
//!   allocate, lock, log or block; it only performs atomic operations
//! - `synchronize` spins rather than parks since deliveries are a handful
//!   of instructions long

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::counter::CounterRecord;

/// What a handler reports back to the line after a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Handled,
    NotHandled,
}

#[derive(Debug)]
struct Shared {
    record: Arc<CounterRecord>,
    in_flight: AtomicUsize,
}

/// Handler registered against the line. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct SignalHandler {
    shared: Arc<Shared>,
}

impl SignalHandler {
    pub fn new(record: Arc<CounterRecord>) -> Self {
        Self {
            shared: Arc::new(Shared {
                record,
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Fast path: count the event.
    #[inline]
    pub fn handle(&self) -> Verdict {
        let _delivery = InFlight::enter(&self.shared.in_flight);
        self.shared.record.increment();
        Verdict::Handled
    }

    /// Number of deliveries currently executing `handle`.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Wait until no delivery is executing `handle`.
    pub fn synchronize(&self) {
        while self.shared.in_flight.load(Ordering::Acquire) != 0 {
            std::hint::spin_loop();
            std::thread::yield_now();
        }
    }
}

/// Marks one delivery as in flight for its lifetime.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    #[inline]
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    #[inline]
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn handle_counts_and_reports_handled() {
        let record = Arc::new(CounterRecord::new());
        let handler = SignalHandler::new(record.clone());

        for _ in 0..5 {
            assert_eq!(handler.handle(), Verdict::Handled);
        }
        assert_eq!(record.count(), 5);
        assert_eq!(handler.in_flight(), 0);
    }

    #[test]
    fn synchronize_waits_for_in_flight_delivery() {
        let handler = SignalHandler::new(Arc::new(CounterRecord::new()));
        let released = Arc::new(AtomicBool::new(false));

        // Simulate a delivery stuck mid-handler.
        let delivery = InFlight::enter(&handler.shared.in_flight);
        let waiter = {
            let handler = handler.clone();
            let released = released.clone();
            thread::spawn(move || {
                handler.synchronize();
                assert!(released.load(Ordering::SeqCst));
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        released.store(true, Ordering::SeqCst);
        drop(delivery);
        waiter.join().unwrap();
    }
}
