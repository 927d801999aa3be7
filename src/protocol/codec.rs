//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. Pure functions:
//! no I/O, no shared state; time comes from the caller's [`Clock`].
//!
//! ## Header Layout
//! ```text
//! offset  size  field
//! 0       1     version
//! 1       1     command
//! 2       8     expires_at (unix seconds, SET only)
//! 10      2     key_len
//! 12      2     data_len
//! 14      4     reserved (zero)
//! 18      ..    key, then data
//! ```

use bytes::{BufMut, Bytes};
use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::{CacheError, Result};
use super::{Command, CommandType};

/// Protocol version carried in every frame
pub const VERSION: u8 = 1;

/// Fixed header size
pub const HEADER_SIZE: usize = 18;

/// Largest key or data length the u16 length fields can describe
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

const EXPIRES_OFFSET: usize = 2;
const KEY_LEN_OFFSET: usize = 10;
const DATA_LEN_OFFSET: usize = 12;

// =============================================================================
// Header Field Access
// =============================================================================

/// Declared `(key_len, data_len)` of a buffer holding at least a header
pub(crate) fn body_lengths(header: &[u8]) -> (usize, usize) {
    let key_len = u16::from_be_bytes([header[KEY_LEN_OFFSET], header[KEY_LEN_OFFSET + 1]]);
    let data_len = u16::from_be_bytes([header[DATA_LEN_OFFSET], header[DATA_LEN_OFFSET + 1]]);
    (key_len as usize, data_len as usize)
}

fn expires_field(header: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&header[EXPIRES_OFFSET..EXPIRES_OFFSET + 8]);
    u64::from_be_bytes(raw)
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Fails with `InvalidArgument` for an empty or oversized key, a SET without
/// data, or a SET whose expiry is not after `clock.now()`.
pub fn encode_command(command: &Command, clock: &dyn Clock) -> Result<Vec<u8>> {
    command.validate(clock)?;

    let (expires, data): (u64, &[u8]) = match command {
        Command::Get { .. } => (0, &[][..]),
        Command::Set { data, expires_at, .. } => {
            let secs = u64::try_from(expires_at.timestamp()).map_err(|_| {
                CacheError::InvalidArgument(format!("expiry {} is before the epoch", expires_at))
            })?;
            (secs, &data[..])
        }
    };
    let key = command.key().as_bytes();

    let mut message = Vec::with_capacity(HEADER_SIZE + key.len() + data.len());
    message.put_u8(VERSION);
    message.put_u8(command.command_type() as u8);
    message.put_u64(expires);
    message.put_u16(key.len() as u16);
    message.put_u16(data.len() as u16);
    message.put_u32(0);
    message.extend_from_slice(key);
    message.extend_from_slice(data);

    Ok(message)
}

/// Validate the raw parts of a command and encode them
pub fn encode_frame(
    kind: CommandType,
    key: &str,
    data: &[u8],
    expires_at: DateTime<Utc>,
    clock: &dyn Clock,
) -> Result<Vec<u8>> {
    let command = Command::new(kind, key, Bytes::copy_from_slice(data), expires_at, clock)?;
    encode_command(&command, clock)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode exactly one frame
///
/// Checks run in a fixed order: header length, version, key presence,
/// body length, command tag, then command-specific rules.
pub fn decode_command(bytes: &[u8], clock: &dyn Clock) -> Result<Command> {
    if bytes.len() < HEADER_SIZE {
        return Err(CacheError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != VERSION {
        return Err(CacheError::VersionMismatch {
            expected: VERSION,
            actual: version,
        });
    }

    let (key_len, data_len) = body_lengths(bytes);
    if key_len == 0 {
        return Err(CacheError::MissingKey);
    }

    let body = &bytes[HEADER_SIZE..];
    if body.len() != key_len + data_len {
        return Err(CacheError::LengthMismatch {
            expected: key_len + data_len,
            actual: body.len(),
        });
    }

    let kind = CommandType::try_from(bytes[1])?;

    let key = std::str::from_utf8(&body[..key_len])
        .map_err(|_| CacheError::InvalidKey)?
        .to_string();
    let data = &body[key_len..];

    match kind {
        CommandType::Get => {
            if !data.is_empty() {
                return Err(CacheError::UnexpectedData);
            }
            Ok(Command::Get { key })
        }
        CommandType::Set => {
            if data.is_empty() {
                return Err(CacheError::MissingData);
            }

            let raw = expires_field(bytes);
            let expires_at = i64::try_from(raw)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or(CacheError::InvalidExpiry(raw))?;
            if expires_at <= clock.now() {
                return Err(CacheError::ExpiredOnArrival(expires_at));
            }

            Ok(Command::Set {
                key,
                data: Bytes::copy_from_slice(data),
                expires_at,
            })
        }
    }
}
