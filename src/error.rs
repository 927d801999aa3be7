//! Error types for handcache
//!
//! Provides a unified error type for all operations.
//!
//! Errors fall into three groups that the connection handler treats
//! differently:
//! - protocol errors end the connection after an error reply,
//! - cache errors are replied to and the connection stays open,
//! - transport errors end the connection silently.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Unified error type for handcache operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream on a frame boundary.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Not enough data: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("Missing key")]
    MissingKey,

    #[error("Key is not valid UTF-8")]
    InvalidKey,

    #[error("Length of data doesn't match header: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid command: {0}")]
    UnknownCommand(u8),

    #[error("Data passed to GET")]
    UnexpectedData,

    #[error("No data passed to SET")]
    MissingData,

    #[error("Expiry timestamp {0} is out of range")]
    InvalidExpiry(u64),

    #[error("Expired on arrival: {0}")]
    ExpiredOnArrival(DateTime<Utc>),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    #[error("Value doesn't exist")]
    NotFound,

    #[error("Expired")]
    Expired,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// True for errors raised while framing or decoding a request.
    ///
    /// Once one of these is seen the byte stream can't be re-synchronised,
    /// so the connection must be closed.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            CacheError::Truncated { .. }
                | CacheError::VersionMismatch { .. }
                | CacheError::MissingKey
                | CacheError::InvalidKey
                | CacheError::LengthMismatch { .. }
                | CacheError::UnknownCommand(_)
                | CacheError::UnexpectedData
                | CacheError::MissingData
                | CacheError::InvalidExpiry(_)
                | CacheError::ExpiredOnArrival(_)
                | CacheError::FrameTooLarge { .. }
        )
    }

    /// True for routine cache misses, as opposed to a store refusing a write.
    ///
    /// The connection handler logs the former at debug and the latter at warn.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CacheError::NotFound | CacheError::Expired)
    }
}
