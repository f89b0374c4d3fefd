//! The control device: command execution under the exclusivity token.
//!
//! # Responsibilities
//! - Attach and detach sessions (outside the token)
//! - Run GET_COUNT, RESET and GET_TIME, each holding the token for its body
//! - Reject a command immediately when another one is in flight
//!
//! # Design Decisions
//! - Exclusivity is per command, not per session: two sessions may
//!   interleave commands but never run two at once
//! - No queueing or retry here; the caller decides whether to retry

use std::sync::Arc;
use thiserror::Error;

use crate::control::protocol::{Request, Response};
use crate::control::session::{SessionGuard, SessionId, SessionTracker};
use crate::counter::{CommandGuard, CounterRecord, ExclusivityToken, LastReset, ResetTime};
use crate::observability::metrics;

/// Errors returned by control commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Another command currently holds the token.
    #[error("device is busy")]
    Busy,
}

/// Owner of the counter state as seen from the control path.
#[derive(Debug)]
pub struct ControlDevice {
    record: Arc<CounterRecord>,
    token: ExclusivityToken,
    sessions: SessionTracker,
}

impl ControlDevice {
    pub fn new(record: Arc<CounterRecord>) -> Self {
        Self {
            record,
            token: ExclusivityToken::new(),
            sessions: SessionTracker::new(),
        }
    }

    /// Attach a new session. Always succeeds while the device exists.
    pub fn attach(self: &Arc<Self>) -> Session {
        let guard = self.sessions.track();
        tracing::info!(
            session_id = %guard.id(),
            active = self.sessions.active_count(),
            "Session attached"
        );
        Session {
            device: Arc::clone(self),
            guard,
        }
    }

    pub fn record(&self) -> &Arc<CounterRecord> {
        &self.record
    }

    pub fn token(&self) -> &ExclusivityToken {
        &self.token
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    fn acquire(&self, session: SessionId, command: &'static str) -> Result<CommandGuard<'_>, ControlError> {
        self.token.try_acquire().ok_or_else(|| {
            tracing::warn!(session_id = %session, command, "Device is busy");
            ControlError::Busy
        })
    }

    fn get_count(&self, session: SessionId) -> Result<u64, ControlError> {
        let _guard = self.acquire(session, "get_count")?;
        let count = self.record.count();
        tracing::info!(session_id = %session, count, "Count retrieved");
        metrics::record_interrupt_count(count);
        Ok(count)
    }

    fn reset(&self, session: SessionId) -> Result<ResetTime, ControlError> {
        let _guard = self.acquire(session, "reset")?;
        let epoch = self.record.reset_at(ResetTime::now());
        tracing::info!(
            session_id = %session,
            previous_count = epoch.previous_count,
            reset_at_ns = epoch.started_at.as_nanos(),
            "Counter has been reset"
        );
        metrics::record_interrupt_count(0);
        Ok(epoch.started_at)
    }

    fn get_last_reset_time(&self, session: SessionId) -> Result<LastReset, ControlError> {
        let _guard = self.acquire(session, "get_time")?;
        let last = self.record.last_reset();
        match last {
            LastReset::At(t) => {
                tracing::info!(session_id = %session, reset_at_ns = t.as_nanos(), "Time retrieved")
            }
            LastReset::NotYetReset => {
                tracing::info!(session_id = %session, "Timer has not yet been reset")
            }
        }
        Ok(last)
    }
}

/// A client's attachment to the control device. Dropping it detaches.
#[derive(Debug)]
pub struct Session {
    device: Arc<ControlDevice>,
    guard: SessionGuard,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.guard.id()
    }

    /// Current event count.
    pub fn get_count(&self) -> Result<u64, ControlError> {
        self.device.get_count(self.id())
    }

    /// Zero the count and stamp the reset time.
    pub fn reset(&self) -> Result<(), ControlError> {
        self.device.reset(self.id()).map(|_| ())
    }

    /// Time of the last reset, or [`LastReset::NotYetReset`].
    pub fn get_last_reset_time(&self) -> Result<LastReset, ControlError> {
        self.device.get_last_reset_time(self.id())
    }

    /// Run one protocol request.
    pub fn execute(&self, request: Request) -> Response {
        let response = match request {
            Request::Reset => self.reset().map(|()| Response::Reset),
            Request::GetCount => self.get_count().map(|count| Response::Count { count }),
            Request::GetTime => self.get_last_reset_time().map(|last| match last {
                LastReset::At(last_reset_ns) => Response::Time { last_reset_ns },
                LastReset::NotYetReset => Response::NotYetReset,
            }),
        }
        .unwrap_or_else(|ControlError::Busy| Response::Busy);

        metrics::record_command(request.label(), response.outcome());
        response
    }

    /// Detach explicitly. Equivalent to dropping the session.
    pub fn detach(self) {
        drop(self);
    }
}
