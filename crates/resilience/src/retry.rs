// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;
use tracing::warn;

/// Invoke `f` up to `attempts` times. On a failure for which
/// `should_retry(&err)` is true, sleep `delay * backoff^(k-1)` (k = attempt
/// number, 1-indexed) and retry; the final attempt's error (or a
/// non-retryable error on any attempt) is returned as-is.
///
/// `attempts < 1` is a programmer error, not a recoverable condition — it
/// panics rather than returning a `Result`.
pub fn retry_call<T, E>(
    mut f: impl FnMut() -> Result<T, E>,
    attempts: u32,
    delay: Duration,
    backoff: f64,
    should_retry: impl Fn(&E) -> bool,
) -> Result<T, E> {
    assert!(attempts >= 1, "retry_call: attempts must be >= 1, got {attempts}");

    for attempt in 1..=attempts {
        match f() {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retryable = should_retry(&err);
                if attempt == attempts || !retryable {
                    return Err(err);
                }
                let sleep_for = delay.mul_f64(backoff.powi(attempt as i32 - 1));
                warn!(attempt, attempts, sleep_ms = sleep_for.as_millis() as u64, "retrying after failure");
                std::thread::sleep(sleep_for);
            }
        }
    }
    unreachable!("retry_call: loop always returns on or before its last iteration")
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
