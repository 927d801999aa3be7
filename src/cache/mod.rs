//! Cache Module
//!
//! In-memory, count-bounded LRU store with per-entry absolute expiry.
//!
//! ## Responsibilities
//! - Key lookups and upserts under a single mutex
//! - Recency ordering for eviction (most-recently-used first)
//! - Lazy expiry: expired entries are refused on read but stay in place
//!   until they are overwritten or evicted

mod lru;
mod store;

pub use store::Store;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A stored value and its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: Bytes,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// True once `now` has reached the expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
