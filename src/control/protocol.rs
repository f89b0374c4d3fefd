//! Control protocol messages.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! → {"command":"GET_COUNT"}
//! ← {"status":"count","count":5}
//! → {"command":"RESET"}
//! ← {"status":"reset"}
//! → {"command":"GET_TIME"}
//! ← {"status":"time","last_reset_ns":1700000000000000000}
//! ← {"status":"not_yet_reset"}
//! ← {"status":"busy"}
//! ```

use serde::{Deserialize, Serialize};

use crate::counter::ResetTime;

/// A command sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    Reset,
    GetCount,
    GetTime,
}

impl Request {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Request::Reset => "reset",
            Request::GetCount => "get_count",
            Request::GetTime => "get_time",
        }
    }
}

/// The service's answer to one request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Counter zeroed and reset time stamped.
    Reset,
    /// Current count.
    Count { count: u64 },
    /// Time of the last reset.
    Time { last_reset_ns: ResetTime },
    /// No reset has happened yet.
    NotYetReset,
    /// Another command is in flight; nothing was done.
    Busy,
    /// The request line could not be understood.
    Invalid { reason: String },
}

impl Response {
    /// Outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Response::Busy => "busy",
            Response::Invalid { .. } => "invalid",
            _ => "ok",
        }
    }
}

/// Parse one request line.
pub fn decode_request(line: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Serialize a response as one newline-terminated line.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = serde_json::to_vec(response)?;
    out.push(b'\n');
    Ok(out)
}
