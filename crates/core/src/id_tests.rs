// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test id type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_round_trips_through_string() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.as_str(), "tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn define_id_new_has_prefix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
}

#[test]
fn define_id_new_generates_distinct_ids() {
    let a = TestId::new();
    let b = TestId::new();
    assert_ne!(a, b);
}

#[test]
fn define_id_hash_map_lookup_by_str() {
    let mut map: HashMap<TestId, i32> = HashMap::new();
    let id = TestId::from_string("tst-k");
    map.insert(id, 42);
    assert_eq!(map.get("tst-k"), Some(&42));
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(8), "abcdefgh");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn define_id_display_matches_as_str() {
    let id = TestId::from_string("tst-xyz");
    assert_eq!(format!("{id}"), "tst-xyz");
}

#[test]
fn short_fn_truncates() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn job_id_is_hex_and_at_least_eight_chars() {
    let id = JobId::new();
    assert!(id.as_str().len() >= 8);
    assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn job_id_generates_distinct_ids() {
    let a = JobId::new();
    let b = JobId::new();
    assert_ne!(a, b);
}
