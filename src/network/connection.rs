//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufWriter, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Store;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::protocol::{decode_command, write_response, Command, FrameReader, Response};

/// Handles a single client connection
pub struct Connection<R, W: Write> {
    /// Frame accumulator over the read half
    reader: FrameReader<R>,

    /// Write half (buffered for efficiency)
    writer: BufWriter<W>,

    /// Shared cache
    store: Arc<Store>,

    /// Clock used to reject frames that expire on arrival
    clock: Arc<dyn Clock>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream, TcpStream> {
    /// Create a handler for an accepted TCP stream
    ///
    /// Disables Nagle and applies the configured timeouts, if any.
    pub fn from_tcp(stream: TcpStream, store: Arc<Store>, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;
        Ok(Self::new(read_stream, stream, store, config, peer_addr))
    }
}

impl<R: Read, W: Write> Connection<R, W> {
    /// Create a handler over any read/write pair
    pub fn new(
        reader: R,
        writer: W,
        store: Arc<Store>,
        config: &Config,
        peer_addr: impl Into<String>,
    ) -> Self {
        let clock = Arc::clone(store.clock());
        Self {
            reader: FrameReader::from_config(reader, config),
            writer: BufWriter::new(writer),
            store,
            clock,
            peer_addr: peer_addr.into(),
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Cache misses are answered and the loop continues. Framing and decode
    /// errors are answered and end the connection with the error, since
    /// the stream can't be re-synchronised after a bad header.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let frame = match self.reader.read_frame() {
                Ok(frame) => frame,
                Err(CacheError::ConnectionClosed) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(CacheError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) if e.is_protocol() => {
                    tracing::warn!("Unreadable frame from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(&Response::Unreadable(e.to_string()));
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let command = match decode_command(&frame, &*self.clock) {
                Ok(command) => command,
                Err(e) => {
                    tracing::warn!("Undecodable frame from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(&Response::Undecodable(e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(&response) {
                if let CacheError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command against the store and build its reply
    fn execute_command(&self, command: Command) -> Response {
        match command {
            Command::Get { key } => match self.store.get(&key) {
                Ok(value) => Response::Value(value),
                Err(e) => {
                    self.log_cache_error("GET", &key, &e);
                    Response::get_failed(&key, &e)
                }
            },
            Command::Set {
                key,
                data,
                expires_at,
            } => match self.store.set(key.clone(), data, expires_at) {
                Ok(expires_at) => Response::Stored { key, expires_at },
                Err(e) => {
                    self.log_cache_error("SET", &key, &e);
                    Response::set_failed(&key, &e)
                }
            },
        }
    }

    /// Misses and expiries are routine; anything else the store refuses is not
    fn log_cache_error(&self, op: &str, key: &str, e: &CacheError) {
        if e.is_recoverable() {
            tracing::debug!("{} {:?} from {} failed: {}", op, key, self.peer_addr, e);
        } else {
            tracing::warn!("{} {:?} from {} refused: {}", op, key, self.peer_addr, e);
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Get a reference to the underlying writer
    pub fn writer(&self) -> &W {
        self.writer.get_ref()
    }
}

/// Errors that mean the peer is gone rather than misbehaving
fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
