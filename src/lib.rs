//! # handcache
//!
//! An in-memory key-value cache with:
//! - Absolute, per-entry expiry
//! - Count-bounded LRU eviction
//! - A fixed-header binary request protocol over TCP
//! - One worker thread per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │               (one thread per connection)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ raw bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Frame Reader                              │
//! │          (reassembles frames from fragments)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one frame
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Codec                                  │
//! │               (validate + decode)                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Store                                  │
//! │            (Mutex<LRU arena + expiry>)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod cache;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, Result};
pub use config::Config;
pub use clock::{Clock, ManualClock, SystemClock};
pub use cache::Store;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of handcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
