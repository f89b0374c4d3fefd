//! Shared counter state.
//!
//! # Data Flow
//! ```text
//! Signal line (fast path):
//!     SignalHandler::handle → record.rs increment (fetch_add)
//!
//! Control path (under token.rs):
//!     GET_COUNT → record.rs count (load)
//!     RESET     → record.rs reset (swap to 0, stamp time)
//!     GET_TIME  → record.rs last_reset (load)
//! ```
//!
//! # Design Decisions
//! - Count and reset touch the same atomic, so an event racing a reset
//!   lands wholly in one epoch
//! - The token serializes commands only; the fast path never takes it

pub mod record;
pub mod token;

pub use record::{CounterRecord, Epoch, LastReset, ResetTime};
pub use token::{CommandGuard, ExclusivityToken, TokenState};
