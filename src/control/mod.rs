//! Control interface subsystem.
//!
//! # Data Flow
//! ```text
//! Client connects
//!     → channel.rs (accept on the Unix socket)
//!     → device.rs attach (session.rs reference count +1)
//!     → connection.rs (one JSON request per line)
//!     → device.rs command under the exclusivity token
//!     → protocol.rs response line
//! Client disconnects
//!     → session detached (reference count -1)
//! ```
//!
//! # Design Decisions
//! - One connection is one session
//! - Busy is an ordinary response, never a dropped connection

pub mod channel;
pub mod connection;
pub mod device;
pub mod protocol;
pub mod session;

pub use channel::{ChannelError, ControlChannel};
pub use device::{ControlDevice, ControlError, Session};
pub use protocol::{Request, Response};
pub use session::{SessionId, SessionTracker};
