//! Keyboard interrupt counter.
//!
//! Counts deliveries of the keyboard interrupt line and exposes the count,
//! plus the time of the last reset, to one command at a time over a control
//! socket.

pub mod config;
pub mod control;
pub mod counter;
pub mod irq;
pub mod lifecycle;
pub mod observability;
pub mod service;

pub use config::KicConfig;
pub use lifecycle::Shutdown;
pub use service::Service;
