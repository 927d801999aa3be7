//! Command definitions
//!
//! Represents commands from clients.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::{CacheError, Result};
use super::codec::MAX_FIELD_LEN;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
}

impl TryFrom<u8> for CommandType {
    type Error = CacheError;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(CommandType::Get),
            0x02 => Ok(CommandType::Set),
            other => Err(CacheError::UnknownCommand(other)),
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up a key
    Get { key: String },

    /// Store a value until an absolute expiry (whole seconds)
    Set {
        key: String,
        data: Bytes,
        expires_at: DateTime<Utc>,
    },
}

impl Command {
    /// Build a GET without validation
    pub fn get(key: impl Into<String>) -> Self {
        Command::Get { key: key.into() }
    }

    /// Build a SET without validation
    ///
    /// The expiry is truncated to whole seconds, the precision the wire
    /// format carries.
    pub fn set(key: impl Into<String>, data: impl Into<Bytes>, expires_at: DateTime<Utc>) -> Self {
        Command::Set {
            key: key.into(),
            data: data.into(),
            expires_at: truncate_to_secs(expires_at),
        }
    }

    /// Build a command, rejecting anything that couldn't be encoded
    ///
    /// `expires_at` is ignored for GET.
    pub fn new(
        kind: CommandType,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        expires_at: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> Result<Self> {
        let key = key.into();
        let data = data.into();

        let command = match kind {
            CommandType::Get => {
                if !data.is_empty() {
                    return Err(CacheError::InvalidArgument(
                        "GET takes no data".to_string(),
                    ));
                }
                Command::get(key)
            }
            CommandType::Set => Command::set(key, data, expires_at),
        };

        command.validate(clock)?;
        Ok(command)
    }

    /// Check the preconditions for encoding
    pub(crate) fn validate(&self, clock: &dyn Clock) -> Result<()> {
        let key = self.key();
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key must not be empty".to_string()));
        }
        if key.len() > MAX_FIELD_LEN {
            return Err(CacheError::InvalidArgument(format!(
                "key is {} bytes (max {})",
                key.len(),
                MAX_FIELD_LEN
            )));
        }

        if let Command::Set { data, expires_at, .. } = self {
            if data.is_empty() {
                return Err(CacheError::InvalidArgument(
                    "SET requires data".to_string(),
                ));
            }
            if data.len() > MAX_FIELD_LEN {
                return Err(CacheError::InvalidArgument(format!(
                    "data is {} bytes (max {})",
                    data.len(),
                    MAX_FIELD_LEN
                )));
            }
            let now = clock.now();
            if *expires_at <= now {
                return Err(CacheError::InvalidArgument(format!(
                    "negative TTL: expiry {} is not after {}",
                    expires_at, now
                )));
            }
        }

        Ok(())
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
        }
    }

    /// The key this command addresses
    pub fn key(&self) -> &str {
        match self {
            Command::Get { key } | Command::Set { key, .. } => key,
        }
    }
}

fn truncate_to_secs(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}
