//! Store Tests
//!
//! Tests verify:
//! - Get/Set semantics and error cases
//! - Expiry boundary handling
//! - LRU eviction and recency promotion
//! - Concurrent access through a shared store

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use chrono::Duration;
use handcache::protocol::{decode_command, encode_command, Command};
use handcache::{CacheError, Clock, ManualClock, Store};

const NOW: i64 = 1_700_000_000;

fn store_with(max_items: usize) -> (Store, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_unix(NOW));
    (Store::new(max_items, clock.clone()), clock)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let (store, _) = store_with(0);
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.max_items(), 0);
}

#[test]
fn test_set_and_get() {
    let (store, clock) = store_with(0);
    let expires_at = clock.expires_in(60);

    assert_eq!(store.set("key1", &b"value1"[..], expires_at).unwrap(), expires_at);
    assert_eq!(store.get("key1").unwrap(), Bytes::from_static(b"value1"));
}

#[test]
fn test_get_missing_key() {
    let (store, _) = store_with(0);
    assert!(matches!(store.get("nope"), Err(CacheError::NotFound)));
}

#[test]
fn test_set_overwrites_value_and_expiry() {
    let (store, clock) = store_with(0);
    store.set("k", &b"v1"[..], clock.expires_in(10)).unwrap();
    let later = clock.expires_in(100);
    store.set("k", &b"v2"[..], later).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("k").unwrap(), Bytes::from_static(b"v2"));

    clock.advance(Duration::seconds(50));
    assert_eq!(store.get("k").unwrap(), Bytes::from_static(b"v2"));
}

#[test]
fn test_set_rejects_expiry_not_in_future() {
    let (store, clock) = store_with(0);

    assert!(matches!(
        store.set("k", &b"v"[..], clock.now()),
        Err(CacheError::ExpiredOnArrival(_))
    ));
    assert!(matches!(
        store.set("k", &b"v"[..], clock.expires_in(-1)),
        Err(CacheError::ExpiredOnArrival(_))
    ));
    assert!(store.is_empty());
}

#[test]
fn test_misses_are_recoverable_but_refused_sets_are_not() {
    let (store, clock) = store_with(0);
    store.set("k", &b"v"[..], clock.expires_in(1)).unwrap();

    assert!(store.get("nope").unwrap_err().is_recoverable());
    clock.advance(Duration::seconds(1));
    assert!(store.get("k").unwrap_err().is_recoverable());
    assert!(!store.set("k", &b"v"[..], clock.now()).unwrap_err().is_recoverable());
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_get_expired_at_boundary() {
    let (store, clock) = store_with(0);
    store.set("k", &b"v"[..], clock.expires_in(10)).unwrap();

    clock.advance(Duration::seconds(9));
    assert!(store.get("k").is_ok());

    // expires_at == now counts as expired
    clock.advance(Duration::seconds(1));
    assert!(matches!(store.get("k"), Err(CacheError::Expired)));
}

#[test]
fn test_expired_entries_are_not_purged_by_get() {
    let (store, clock) = store_with(0);
    store.set("k", &b"v"[..], clock.expires_in(1)).unwrap();
    clock.advance(Duration::seconds(5));

    assert!(matches!(store.get("k"), Err(CacheError::Expired)));
    assert!(matches!(store.get("k"), Err(CacheError::Expired)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_expired_entry_revived_by_set() {
    let (store, clock) = store_with(0);
    store.set("k", &b"old"[..], clock.expires_in(1)).unwrap();
    clock.advance(Duration::seconds(5));

    store.set("k", &b"new"[..], clock.expires_in(60)).unwrap();
    assert_eq!(store.get("k").unwrap(), Bytes::from_static(b"new"));
}

// =============================================================================
// Eviction Tests
// =============================================================================

#[test]
fn test_eviction_removes_least_recently_set() {
    let (store, clock) = store_with(2);
    let exp = clock.expires_in(60);
    store.set("a", &b"1"[..], exp).unwrap();
    store.set("b", &b"2"[..], exp).unwrap();
    store.set("c", &b"3"[..], exp).unwrap();

    assert_eq!(store.len(), 2);
    assert!(matches!(store.get("a"), Err(CacheError::NotFound)));
    assert!(store.get("b").is_ok());
    assert!(store.get("c").is_ok());
}

#[test]
fn test_get_promotes_ahead_of_eviction() {
    let (store, clock) = store_with(2);
    let exp = clock.expires_in(60);
    store.set("a", &b"1"[..], exp).unwrap();
    store.set("b", &b"2"[..], exp).unwrap();
    store.get("a").unwrap();
    store.set("c", &b"3"[..], exp).unwrap();

    assert!(matches!(store.get("b"), Err(CacheError::NotFound)));
    assert!(store.get("a").is_ok());
    assert!(store.get("c").is_ok());
}

#[test]
fn test_update_promotes_and_never_evicts() {
    let (store, clock) = store_with(2);
    let exp = clock.expires_in(60);
    store.set("a", &b"1"[..], exp).unwrap();
    store.set("b", &b"2"[..], exp).unwrap();

    store.set("a", &b"1b"[..], exp).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.keys(), vec!["a", "b"]);

    store.set("c", &b"3"[..], exp).unwrap();
    assert_eq!(store.keys(), vec!["c", "a"]);
}

#[test]
fn test_expired_get_does_not_promote() {
    let (store, clock) = store_with(2);
    store.set("a", &b"1"[..], clock.expires_in(1)).unwrap();
    store.set("b", &b"2"[..], clock.expires_in(60)).unwrap();
    clock.advance(Duration::seconds(2));

    assert!(matches!(store.get("a"), Err(CacheError::Expired)));
    store.set("c", &b"3"[..], clock.expires_in(60)).unwrap();

    assert!(matches!(store.get("a"), Err(CacheError::NotFound)));
    assert!(store.get("b").is_ok());
}

#[test]
fn test_unbounded_store_never_evicts() {
    let (store, clock) = store_with(0);
    let exp = clock.expires_in(60);
    for i in 0..1_000 {
        store.set(format!("key{}", i), &b"v"[..], exp).unwrap();
    }
    assert_eq!(store.len(), 1_000);
    assert!(store.get("key0").is_ok());
}

#[test]
fn test_capacity_one() {
    let (store, clock) = store_with(1);
    let exp = clock.expires_in(60);
    store.set("a", &b"1"[..], exp).unwrap();
    store.set("b", &b"2"[..], exp).unwrap();

    assert_eq!(store.keys(), vec!["b"]);
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_decoded_set_then_expiry() {
    let (store, clock) = store_with(0);

    let frame = encode_command(&Command::set("k", &b"v"[..], clock.expires_in(1800)), &*clock).unwrap();
    let command = decode_command(&frame, &*clock).unwrap();

    match command {
        Command::Set {
            key,
            data,
            expires_at,
        } => {
            store.set(key, data, expires_at).unwrap();
        }
        other => panic!("Expected SET, got {:?}", other),
    }

    assert_eq!(store.get("k").unwrap(), Bytes::from_static(b"v"));

    clock.advance(Duration::seconds(1801));
    assert!(matches!(store.get("k"), Err(CacheError::Expired)));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_sets_respect_capacity() {
    let (store, clock) = store_with(50);
    let store = Arc::new(store);
    let exp = clock.expires_in(60);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    store.set(format!("t{}-{}", t, i), &b"v"[..], exp).unwrap();
                    let _ = store.get(&format!("t{}-{}", t, i / 2));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 50);
    assert_eq!(store.keys().len(), 50);
}
