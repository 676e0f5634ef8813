// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job record: one user-initiated objective, its status, and its
//! worker process metadata.

use crate::id::JobId;
use serde::{Deserialize, Serialize};

/// A job's lifecycle status. The task-id-parameterized variants correspond
/// to the plan's `analysis:<task>` / `awaiting_exec:<task>` / `executed:<task>`
/// / `blocked:<task>` string family from the store schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Analysis { task_id: String },
    AwaitingExec { task_id: String },
    Executed { task_id: String },
    Blocked { task_id: String },
    Succeeded,
    Failed,
    Terminating,
}

impl JobStatus {
    /// Render as the flat `verb:task` string the task store's `status`
    /// column persists, e.g. `"analysis:build-api"`.
    pub fn as_store_string(&self) -> String {
        match self {
            JobStatus::Pending => "pending".to_string(),
            JobStatus::Running => "running".to_string(),
            JobStatus::Analysis { task_id } => format!("analysis:{task_id}"),
            JobStatus::AwaitingExec { task_id } => format!("awaiting_exec:{task_id}"),
            JobStatus::Executed { task_id } => format!("executed:{task_id}"),
            JobStatus::Blocked { task_id } => format!("blocked:{task_id}"),
            JobStatus::Succeeded => "succeeded".to_string(),
            JobStatus::Failed => "failed".to_string(),
            JobStatus::Terminating => "terminating".to_string(),
        }
    }

    /// Parse the flat store string back into a status. Unknown strings are
    /// preserved as `Running` with no task id lost — the store's `status`
    /// column is the authority and this crate never rejects what it wrote.
    pub fn from_store_string(s: &str) -> Self {
        match s.split_once(':') {
            Some(("analysis", task)) => JobStatus::Analysis { task_id: task.to_string() },
            Some(("awaiting_exec", task)) => JobStatus::AwaitingExec { task_id: task.to_string() },
            Some(("executed", task)) => JobStatus::Executed { task_id: task.to_string() },
            Some(("blocked", task)) => JobStatus::Blocked { task_id: task.to_string() },
            _ => match s {
                "pending" => JobStatus::Pending,
                "succeeded" => JobStatus::Succeeded,
                "failed" => JobStatus::Failed,
                "terminating" => JobStatus::Terminating,
                _ => JobStatus::Running,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One user-initiated objective. History is append-only: a `Job` is created
/// once by the CLI and mutated only by the worker and CLI thereafter; it is
/// never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub objective: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub worker_pid: Option<u32>,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(objective: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: JobId::new(),
            objective: objective.into(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            worker_pid: None,
            status: JobStatus::Pending,
            exit_code: None,
            error: None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
