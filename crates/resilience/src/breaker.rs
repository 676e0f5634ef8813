// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::BreakerOpen;
use numerus_core::Clock;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Internal breaker state, exposed read-only for introspection/tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

struct Inner {
    failure_count: u32,
    open_until: Option<Instant>,
}

/// Three-method circuit breaker: `allow()` / `record_success()` /
/// `record_failure()`. Trips open when `failure_count` reaches `threshold`;
/// stays open for `cooldown`. A success at any time resets the failure
/// count and clears the open deadline; tripping also resets the failure
/// count (one successful attempt after cooldown restores full budget).
pub struct CircuitBreaker<C: Clock> {
    threshold: u32,
    cooldown: Duration,
    clock: C,
    state: Mutex<Inner>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(threshold: u32, cooldown: Duration, clock: C) -> Self {
        Self {
            threshold,
            cooldown,
            clock,
            state: Mutex::new(Inner { failure_count: 0, open_until: None }),
        }
    }

    /// `Ok(())` if a call may proceed; `Err(BreakerOpen)` if the breaker is
    /// tripped and its cooldown has not yet elapsed.
    pub fn allow(&self) -> Result<(), BreakerOpen> {
        let state = self.state.lock();
        match state.open_until {
            Some(until) if self.clock.now() < until => Err(BreakerOpen),
            _ => Ok(()),
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.failure_count = 0;
        state.open_until = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failure_count += 1;
        if state.failure_count >= self.threshold {
            state.open_until = Some(self.clock.now() + self.cooldown);
            state.failure_count = 0;
        }
    }

    pub fn state(&self) -> CircuitState {
        let state = self.state.lock();
        match state.open_until {
            Some(until) if self.clock.now() < until => CircuitState::Open,
            _ => CircuitState::Closed,
        }
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
