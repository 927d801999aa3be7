//! Client Input Tests
//!
//! Tests for turning text lines into commands.

use bytes::Bytes;
use handcache::client::parse_line;
use handcache::protocol::Command;
use handcache::{CacheError, Clock, ManualClock};

fn clock() -> ManualClock {
    ManualClock::at_unix(1_000)
}

#[test]
fn test_parse_get() {
    let cmd = parse_line("GET key", &clock()).unwrap();
    assert_eq!(cmd, Command::get("key"));
}

#[test]
fn test_parse_is_case_insensitive() {
    assert_eq!(parse_line("get key", &clock()).unwrap(), Command::get("key"));
    assert!(matches!(parse_line("sEt key 5 v", &clock()), Ok(Command::Set { .. })));
}

#[test]
fn test_parse_set_converts_ttl_to_absolute_expiry() {
    let clock = clock();
    let cmd = parse_line("SET key 60 hello", &clock).unwrap();
    assert_eq!(
        cmd,
        Command::Set {
            key: "key".to_string(),
            data: Bytes::from_static(b"hello"),
            expires_at: clock.expires_in(60),
        }
    );
}

#[test]
fn test_parse_set_keeps_spaces_in_data() {
    let cmd = parse_line("SET key 60 hello, world and more\n", &clock()).unwrap();
    match cmd {
        Command::Set { data, .. } => assert_eq!(data, Bytes::from_static(b"hello, world and more")),
        other => panic!("Expected SET, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_single_word() {
    assert!(matches!(parse_line("GET", &clock()), Err(CacheError::InvalidArgument(_))));
    assert!(matches!(parse_line("", &clock()), Err(CacheError::InvalidArgument(_))));
}

#[test]
fn test_parse_rejects_unknown_command() {
    assert!(matches!(
        parse_line("DEL key", &clock()),
        Err(CacheError::InvalidArgument(msg)) if msg.contains("del")
    ));
}

#[test]
fn test_parse_rejects_get_with_extra_parts() {
    assert!(matches!(parse_line("GET key extra", &clock()), Err(CacheError::InvalidArgument(_))));
}

#[test]
fn test_parse_rejects_set_without_data() {
    assert!(matches!(parse_line("SET key 60", &clock()), Err(CacheError::InvalidArgument(_))));
}

#[test]
fn test_parse_rejects_non_numeric_ttl() {
    assert!(matches!(
        parse_line("SET key soon value", &clock()),
        Err(CacheError::InvalidArgument(msg)) if msg.contains("soon")
    ));
}

#[test]
fn test_parse_rejects_non_positive_ttl() {
    assert!(matches!(parse_line("SET key 0 v", &clock()), Err(CacheError::InvalidArgument(_))));
    assert!(matches!(
        parse_line("SET key -5 v", &clock()),
        Err(CacheError::InvalidArgument(msg)) if msg.contains("negative TTL")
    ));
}

#[test]
fn test_parse_rejects_out_of_range_ttl() {
    for line in ["SET k 9223372036854775807 v", "SET k 1000000000000000 v", "SET k -9223372036854775808 v"] {
        assert!(matches!(
            parse_line(line, &clock()),
            Err(CacheError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        parse_line("SET k 1000000000000000 v", &clock()),
        Err(CacheError::InvalidArgument(msg)) if msg.contains("out of range")
    ));
}
