// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[test]
fn succeeds_on_first_call_without_sleeping() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, &str> = retry_call(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        },
        3,
        Duration::from_millis(1),
        2.0,
        |_: &&str| true,
    );
    assert_eq!(result, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn retries_up_to_attempts_then_returns_last_error() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, &str> = retry_call(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("boom")
        },
        3,
        Duration::from_millis(1),
        1.0,
        |_| true,
    );
    assert_eq!(result, Err("boom"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn non_retryable_error_returns_immediately() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, &str> = retry_call(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("fatal")
        },
        5,
        Duration::from_millis(1),
        1.0,
        |_| false,
    );
    assert_eq!(result, Err("fatal"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn succeeds_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let result: Result<u32, &str> = retry_call(
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err("transient")
            } else {
                Ok(99)
            }
        },
        5,
        Duration::from_millis(1),
        1.0,
        |_| true,
    );
    assert_eq!(result, Ok(99));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
#[should_panic(expected = "attempts must be >= 1")]
fn zero_attempts_panics() {
    let _: Result<u32, &str> = retry_call(|| Ok(1), 0, Duration::from_millis(1), 1.0, |_| true);
}
