// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-table schema: one row per job/task the CLI's `status` and
//! `logs` commands read back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task_id: String,
    pub objective: String,
    pub command: String,
    pub status: String,
    pub mode: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub worker_pid: Option<u32>,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

/// Fields accepted by [`crate::TaskStore::update_fields`]. Every field is
/// optional; only the ones present are applied. `updated_at_ms` is always
/// stamped by the store itself, never taken from here.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub status: Option<String>,
    pub worker_pid: Option<Option<u32>>,
    pub exit_code: Option<Option<i32>>,
    pub error: Option<Option<String>>,
}

impl TaskFields {
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn worker_pid(mut self, pid: Option<u32>) -> Self {
        self.worker_pid = Some(pid);
        self
    }

    pub fn exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = Some(error);
        self
    }

    pub(crate) fn apply(self, row: &mut TaskRow) {
        if let Some(status) = self.status {
            row.status = status;
        }
        if let Some(pid) = self.worker_pid {
            row.worker_pid = pid;
        }
        if let Some(code) = self.exit_code {
            row.exit_code = code;
        }
        if let Some(error) = self.error {
            row.error = error;
        }
    }
}
