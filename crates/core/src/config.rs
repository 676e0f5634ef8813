// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-driven configuration, consulted lazily at component
//! construction rather than cached at process start.

use std::path::PathBuf;
use std::time::Duration;

/// `$MCP_RUNS_DIR`, default `runs/`.
pub fn runs_dir() -> PathBuf {
    std::env::var_os("MCP_RUNS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("runs"))
}

/// `$MCP_STORE_PATH`, default `store/tasks.db`.
pub fn store_path() -> PathBuf {
    std::env::var_os("MCP_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("store/tasks.db"))
}

/// `$CODEX_BIN`, default `codex`.
pub fn codex_bin() -> String {
    std::env::var("CODEX_BIN").unwrap_or_else(|_| "codex".to_string())
}

/// Default analysis-phase (claim) timeout: 120s.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

/// Default execution-phase timeout: 600s.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Planner/role-planner invocation timeout: 120s.
pub const DEFAULT_PLANNER_TIMEOUT: Duration = Duration::from_secs(120);

/// Spawn retry policy: 3 attempts, 0.5s base delay.
pub const SPAWN_RETRY_ATTEMPTS: u32 = 3;
pub const SPAWN_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Task store retry policy: 3 attempts, 0.2s base delay.
pub const STORE_RETRY_ATTEMPTS: u32 = 3;
pub const STORE_RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Watcher read budget per loop iteration.
pub const WATCHER_READ_BUDGET: Duration = Duration::from_millis(200);
pub const WATCHER_READ_CHUNK_BYTES: usize = 4096;

/// Dispatcher no-progress backoff.
pub const DISPATCHER_BACKOFF: Duration = Duration::from_millis(500);

/// Planner/claim/execute status-polling interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
