// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use numerus_core::FakeClock;

#[test]
fn allows_calls_while_closed() {
    let breaker = CircuitBreaker::new(3, Duration::from_secs(10), FakeClock::new());
    assert_eq!(breaker.allow(), Ok(()));
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.allow(), Ok(()));
}

#[test]
fn trips_open_after_threshold_consecutive_failures() {
    let breaker = CircuitBreaker::new(3, Duration::from_secs(10), FakeClock::new());
    breaker.record_failure();
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.allow(), Err(BreakerOpen));
}

#[test]
fn allow_succeeds_again_after_cooldown_elapses() {
    let clock = FakeClock::new();
    let breaker = CircuitBreaker::new(2, Duration::from_secs(30), clock.clone());
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.allow(), Err(BreakerOpen));
    clock.advance(Duration::from_secs(31));
    assert_eq!(breaker.allow(), Ok(()));
}

#[test]
fn record_success_resets_failure_count_and_open_deadline() {
    let clock = FakeClock::new();
    let breaker = CircuitBreaker::new(3, Duration::from_secs(30), clock.clone());
    breaker.record_failure();
    breaker.record_failure();
    breaker.record_success();
    breaker.record_failure();
    breaker.record_failure();
    // Only 2 consecutive failures since the reset; still closed.
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[test]
fn tripping_resets_failure_count_so_one_success_restores_full_budget() {
    let clock = FakeClock::new();
    let breaker = CircuitBreaker::new(2, Duration::from_secs(10), clock.clone());
    breaker.record_failure();
    breaker.record_failure();
    clock.advance(Duration::from_secs(11));
    assert_eq!(breaker.allow(), Ok(()));
    breaker.record_success();
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitState::Closed);
}
