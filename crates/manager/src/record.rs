// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manager-level, in-memory record of one agent invocation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

/// Only `exec` exists; kept as an enum so the field reads the same as the
/// store schema and leaves room for a future invocation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    Exec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub workdir: PathBuf,
    pub status: TaskStatus,
    pub start_ms: u64,
    pub end_ms: Option<u64>,
    pub exit_code: Option<i32>,
    pub mode: TaskMode,
    pub command: String,
    pub error: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TaskRecord {
    /// Wall-clock duration in milliseconds, `None` while still running.
    pub fn duration_ms(&self) -> Option<u64> {
        self.end_ms.map(|end| end.saturating_sub(self.start_ms))
    }
}
