// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::Session;
use std::sync::Arc;

#[test]
fn acquire_returns_added_session() {
    let pool = SessionPool::new();
    let session = Arc::new(Session::open("ses-a").expect("open"));
    pool.add(session.clone());
    let acquired = pool.acquire(false, Duration::from_millis(10)).expect("acquire");
    assert_eq!(acquired.id(), "ses-a");
}

#[test]
fn acquire_on_empty_pool_without_blocking_times_out() {
    let pool = SessionPool::new();
    let result = pool.acquire(false, Duration::from_millis(10));
    assert!(matches!(result, Err(PtyError::AcquireTimeout)));
}

#[test]
fn released_session_can_be_reacquired() {
    let pool = SessionPool::new();
    let session = Arc::new(Session::open("ses-b").expect("open"));
    pool.add(session);
    let acquired = pool.acquire(false, Duration::from_millis(10)).expect("acquire");
    pool.release(acquired.id());
    let stats = pool.stats();
    assert_eq!(stats.idle, 1);
    assert_eq!(stats.in_use, 0);
    let reacquired = pool.acquire(false, Duration::from_millis(10)).expect("reacquire");
    assert_eq!(reacquired.id(), "ses-b");
}

#[test]
fn remove_drops_session_from_pool_entirely() {
    let pool = SessionPool::new();
    let session = Arc::new(Session::open("ses-c").expect("open"));
    pool.add(session);
    pool.remove("ses-c");
    assert_eq!(pool.stats().total, 0);
    let result = pool.acquire(false, Duration::from_millis(10));
    assert!(matches!(result, Err(PtyError::AcquireTimeout)));
}

#[test]
fn blocking_acquire_waits_for_a_release() {
    let pool = Arc::new(SessionPool::new());
    let session = Arc::new(Session::open("ses-d").expect("open"));
    pool.add(session);
    let acquired = pool.acquire(false, Duration::from_millis(10)).expect("acquire");

    let pool2 = pool.clone();
    let handle = std::thread::spawn(move || pool2.acquire(true, Duration::from_secs(2)));
    std::thread::sleep(Duration::from_millis(30));
    pool.release(acquired.id());

    let result = handle.join().expect("thread join");
    assert!(result.is_ok());
}

#[test]
fn stats_reflect_in_use_and_idle_counts() {
    let pool = SessionPool::new();
    pool.add(Arc::new(Session::open("ses-e").expect("open")));
    pool.add(Arc::new(Session::open("ses-f").expect("open")));
    assert_eq!(pool.stats(), PoolStats { total: 2, idle: 2, in_use: 0 });
    let _acquired = pool.acquire(false, Duration::from_millis(10)).expect("acquire");
    assert_eq!(pool.stats(), PoolStats { total: 2, idle: 1, in_use: 1 });
}
