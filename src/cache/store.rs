//! Cache store
//!
//! The only state shared between connections. Every operation takes the
//! same mutex for the duration of the in-memory update and never across
//! I/O.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::error::{CacheError, Result};
use super::lru::LruList;
use super::CacheEntry;

/// Bounded, recency-ordered key/value store
pub struct Store {
    /// Entries plus their recency order
    entries: Mutex<LruList>,

    /// Entry limit (0 = unbounded)
    max_items: usize,

    /// Source of "now" for expiry checks
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Create an empty store
    pub fn new(max_items: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(LruList::new()),
            max_items,
            clock,
        }
    }

    /// Insert or overwrite a key
    ///
    /// Overwriting promotes the key and never evicts. Inserting a new key
    /// past `max_items` evicts the least-recently-used entry. Returns the
    /// effective expiry.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        expires_at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        if expires_at <= self.clock.now() {
            return Err(CacheError::ExpiredOnArrival(expires_at));
        }

        let key = key.into();
        let value = value.into();
        let mut entries = self.entries.lock();

        if let Some(slot) = entries.find(&key) {
            if let Some(entry) = entries.entry_mut(slot) {
                entry.value = value;
                entry.expires_at = expires_at;
            }
            entries.promote(slot);
            return Ok(expires_at);
        }

        entries.insert(CacheEntry {
            key,
            value,
            expires_at,
        });

        if self.max_items != 0 && entries.len() > self.max_items {
            if let Some(evicted) = entries.evict_tail() {
                tracing::debug!("Evicted least recently used key '{}'", evicted.key);
            }
        }

        Ok(expires_at)
    }

    /// Look up a key
    ///
    /// An expired entry is reported as `Expired` and left in place without
    /// being promoted.
    pub fn get(&self, key: &str) -> Result<Bytes> {
        let mut entries = self.entries.lock();

        let slot = entries.find(key).ok_or(CacheError::NotFound)?;
        let value = match entries.entry(slot) {
            Some(entry) if entry.is_expired(self.clock.now()) => return Err(CacheError::Expired),
            Some(entry) => entry.value.clone(),
            None => return Err(CacheError::NotFound),
        };

        entries.promote(slot);
        Ok(value)
    }

    /// Number of entries held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry limit (0 = unbounded)
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Keys from most- to least-recently used
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys()
    }

    /// The clock this store checks expiry against
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.len())
            .field("max_items", &self.max_items)
            .finish()
    }
}
