//! Response definitions
//!
//! Replies are single human-readable lines rather than frames. Clients
//! read them with a line-oriented reader.

use std::fmt;
use std::io::Write;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CacheError, Result};

/// A response to send to a client
#[derive(Debug, Clone)]
pub enum Response {
    /// GET hit
    Value(Bytes),

    /// SET accepted
    Stored {
        key: String,
        expires_at: DateTime<Utc>,
    },

    /// GET failed in the cache (miss or expired)
    GetFailed { key: String, reason: String },

    /// SET refused by the cache
    SetFailed { key: String, reason: String },

    /// The request couldn't be framed
    Unreadable(String),

    /// The frame couldn't be decoded
    Undecodable(String),

    /// The server turned the connection away
    Refused(String),
}

impl Response {
    /// Create a GET failure from a cache error
    pub fn get_failed(key: &str, error: &CacheError) -> Self {
        Response::GetFailed {
            key: key.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create a SET failure from a cache error
    pub fn set_failed(key: &str, error: &CacheError) -> Self {
        Response::SetFailed {
            key: key.to_string(),
            reason: error.to_string(),
        }
    }

    /// True if the response reports a failure
    pub fn is_error(&self) -> bool {
        !matches!(self, Response::Value(_) | Response::Stored { .. })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Escape control characters in values and keys so neither can split the line
            Response::Value(value) => {
                write!(f, "GET: {}", String::from_utf8_lossy(value).escape_debug())
            }
            Response::Stored { key, expires_at } => write!(
                f,
                "SET '{}'. Expires: {}",
                key.escape_debug(),
                expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            Response::GetFailed { key, reason } => {
                write!(f, "GET: Error handling key '{}': {}", key.escape_debug(), reason)
            }
            Response::SetFailed { key, reason } => {
                write!(f, "SET: Error setting key '{}': {}", key.escape_debug(), reason)
            }
            Response::Unreadable(reason) => write!(f, "ERROR: Couldn't read frame: {}", reason),
            Response::Undecodable(reason) => write!(f, "ERROR: Couldn't decode frame: {}", reason),
            Response::Refused(reason) => write!(f, "ERROR: Connection refused: {}", reason),
        }
    }
}

/// Write a response as one `\n`-terminated line
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writeln!(writer, "{}", response)?;
    writer.flush()?;
    Ok(())
}
