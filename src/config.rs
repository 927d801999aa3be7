//! Configuration for handcache
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CacheError, Result};
use crate::protocol::{HEADER_SIZE, MAX_FIELD_LEN};

/// Default upper bound on a single frame, header included
///
/// Large enough for the biggest frame the encoder will produce.
pub const DEFAULT_MAX_FRAME_SIZE: usize = HEADER_SIZE + 2 * MAX_FIELD_LEN;

/// Default number of bytes pulled from a socket per read
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Main configuration for a handcache server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of entries before LRU eviction (0 = unbounded)
    pub max_items: usize,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest frame (header + key + data) a connection will buffer
    pub max_frame_size: usize,

    /// Bytes requested from the socket per read
    pub read_chunk_size: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: 0,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            listen_addr: "127.0.0.1:4200".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server can't run with
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size <= HEADER_SIZE {
            return Err(CacheError::Config(format!(
                "max_frame_size must exceed the {} byte header, got {}",
                HEADER_SIZE, self.max_frame_size
            )));
        }
        if self.read_chunk_size == 0 {
            return Err(CacheError::Config(
                "read_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(CacheError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the entry limit (0 = unbounded)
    pub fn max_items(mut self, count: usize) -> Self {
        self.config.max_items = count;
        self
    }

    /// Set the largest accepted frame, in bytes
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the per-read chunk size, in bytes
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
