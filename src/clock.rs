//! Clock capability
//!
//! Every component that needs "now" takes a [`Clock`] instead of reading
//! the system time directly, so tests can pin or advance time.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Absolute expiry for a relative TTL in seconds
    ///
    /// Negative TTLs yield an instant in the past. Returns `None` when the
    /// result falls outside the representable range.
    fn try_expires_in(&self, ttl_secs: i64) -> Option<DateTime<Utc>> {
        Duration::try_seconds(ttl_secs).and_then(|ttl| self.now().checked_add_signed(ttl))
    }

    /// Like [`Clock::try_expires_in`], saturating at the ends of the range
    fn expires_in(&self, ttl_secs: i64) -> DateTime<Utc> {
        self.try_expires_in(ttl_secs).unwrap_or(if ttl_secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Create a clock frozen at whole seconds since the epoch
    ///
    /// Out-of-range values fall back to the epoch itself.
    pub fn at_unix(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// Move the clock forward (or back, for a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
