//! Client
//!
//! Turns text such as `SET key 60 some data` into a [`Command`] and sends
//! it to a server, reading back the one-line reply.
//!
//! ## Input Format
//! ```text
//! GET <key>
//! SET <key> <ttl-seconds> <data...>
//! ```
//! The command word is case-insensitive; SET data is the rest of the line
//! and may contain spaces.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};
use crate::protocol::{encode_command, Command, CommandType};

const GET_USAGE: &str = "expected format: GET <key>";
const SET_USAGE: &str = "expected format: SET <key> <ttl> <data>";

/// Parse one line of user input into a command
///
/// SET's TTL is converted to an absolute expiry against `clock`; a TTL
/// that isn't positive is rejected.
pub fn parse_line(line: &str, clock: &dyn Clock) -> Result<Command> {
    let line = line.trim();
    let parts: Vec<&str> = line.splitn(4, ' ').collect();
    if parts.len() < 2 {
        return Err(CacheError::InvalidArgument(
            "expected 2 to 4 parts: <CMD> <key> [<ttl> <data>]".to_string(),
        ));
    }

    let kind = match parts[0].to_ascii_lowercase().as_str() {
        "get" => CommandType::Get,
        "set" => CommandType::Set,
        other => {
            return Err(CacheError::InvalidArgument(format!(
                "unknown command '{}': should be SET or GET",
                other
            )))
        }
    };
    let key = parts[1];

    match kind {
        CommandType::Get => {
            if parts.len() != 2 {
                return Err(CacheError::InvalidArgument(GET_USAGE.to_string()));
            }
            Command::new(kind, key, Bytes::new(), clock.now(), clock)
        }
        CommandType::Set => {
            if parts.len() != 4 {
                return Err(CacheError::InvalidArgument(SET_USAGE.to_string()));
            }
            let ttl: i64 = parts[2].parse().map_err(|_| {
                CacheError::InvalidArgument(format!("couldn't parse TTL '{}' as an integer", parts[2]))
            })?;
            let data = Bytes::copy_from_slice(parts[3].as_bytes());
            Command::new(kind, key, data, expiry_for(clock, ttl)?, clock)
        }
    }
}

fn expiry_for(clock: &dyn Clock, ttl_secs: i64) -> Result<DateTime<Utc>> {
    clock
        .try_expires_in(ttl_secs)
        .ok_or_else(|| CacheError::InvalidArgument(format!("TTL {} is out of range", ttl_secs)))
}

/// Blocking client holding one connection
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    clock: Arc<dyn Clock>,
}

impl Client {
    /// Connect using the system clock
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        Self::connect_with_clock(addr, Arc::new(SystemClock))
    }

    /// Connect with an explicit clock for TTL conversion
    pub fn connect_with_clock(addr: impl ToSocketAddrs, clock: Arc<dyn Clock>) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: stream,
            clock,
        })
    }

    /// Send a command and wait for the reply line (without its newline)
    pub fn request(&mut self, command: &Command) -> Result<String> {
        let frame = encode_command(command, &*self.clock)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        self.read_reply()
    }

    /// Parse a line of input, send it, and return the reply
    pub fn request_line(&mut self, line: &str) -> Result<String> {
        let command = parse_line(line, &*self.clock)?;
        self.request(&command)
    }

    /// GET a key
    pub fn get(&mut self, key: &str) -> Result<String> {
        self.request(&Command::get(key))
    }

    /// SET a key for `ttl_secs` seconds from now
    pub fn set(&mut self, key: &str, data: impl Into<Bytes>, ttl_secs: i64) -> Result<String> {
        let command = Command::set(key, data, expiry_for(&*self.clock, ttl_secs)?);
        self.request(&command)
    }

    fn read_reply(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(CacheError::ConnectionClosed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}
