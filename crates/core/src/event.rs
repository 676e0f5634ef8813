// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event record shared by the per-task/per-job NDJSON streams and the
//! in-process event bus. One enum covers both the `terminal.*` namespace
//! (manager/watcher events) and the `job.*` namespace (dispatcher events) —
//! a single typed payload instead of untyped JSON, so bus subscribers and
//! NDJSON writers can't silently drop fields (see `numerus-core`'s design
//! notes on dynamic JSON payloads).

use serde::{Deserialize, Serialize};

/// Events published on the bus and appended to NDJSON event streams.
///
/// Serializes with `{"type": "namespace:name", ...fields}`; `topic()`
/// renders the bus topic string: `terminal.<name>` for manager/watcher
/// events, `job.<name>` for dispatcher events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- terminal (manager/watcher) events, one per agent invocation --
    #[serde(rename = "terminal:started")]
    TerminalStarted { task_id: String, command: String },

    #[serde(rename = "terminal:stdout")]
    TerminalStdout { task_id: String, chunk: String },

    #[serde(rename = "terminal:timeout")]
    TerminalTimeout { task_id: String },

    #[serde(rename = "terminal:killed")]
    TerminalKilled { task_id: String },

    #[serde(rename = "terminal:exit")]
    TerminalExit {
        task_id: String,
        exit_code: Option<i32>,
        error: Option<String>,
    },

    // -- job (dispatcher) events --
    #[serde(rename = "job:claim_recorded")]
    JobClaimRecorded { job_id: String, task_id: String },

    #[serde(rename = "job:claim_blocked")]
    JobClaimBlocked { job_id: String, task_id: String },

    #[serde(rename = "job:claim_unblocked")]
    JobClaimUnblocked { job_id: String, task_id: String },

    #[serde(rename = "job:claim_approved")]
    JobClaimApproved { job_id: String, task_id: String },

    #[serde(rename = "job:locks_released")]
    JobLocksReleased { job_id: String, task_id: String },

    #[serde(rename = "job:task_completed")]
    JobTaskCompleted {
        job_id: String,
        task_id: String,
        stdout_log_path: String,
    },

    #[serde(rename = "job:task_failed")]
    JobTaskFailed {
        job_id: String,
        task_id: String,
        error: String,
    },

    #[serde(rename = "job:roles_assigned")]
    JobRolesAssigned {
        job_id: String,
        roles: std::collections::HashMap<String, String>,
    },
}

impl Event {
    /// The bare `namespace:name` tag, matching the serde `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TerminalStarted { .. } => "terminal:started",
            Event::TerminalStdout { .. } => "terminal:stdout",
            Event::TerminalTimeout { .. } => "terminal:timeout",
            Event::TerminalKilled { .. } => "terminal:killed",
            Event::TerminalExit { .. } => "terminal:exit",
            Event::JobClaimRecorded { .. } => "job:claim_recorded",
            Event::JobClaimBlocked { .. } => "job:claim_blocked",
            Event::JobClaimUnblocked { .. } => "job:claim_unblocked",
            Event::JobClaimApproved { .. } => "job:claim_approved",
            Event::JobLocksReleased { .. } => "job:locks_released",
            Event::JobTaskCompleted { .. } => "job:task_completed",
            Event::JobTaskFailed { .. } => "job:task_failed",
            Event::JobRolesAssigned { .. } => "job:roles_assigned",
        }
    }

    /// The bus topic string: `terminal.<name>` or `job.<name>`.
    pub fn topic(&self) -> String {
        match self.name().split_once(':') {
            Some((ns, rest)) => format!("{ns}.{rest}"),
            None => self.name().to_string(),
        }
    }

    /// The task id this event pertains to, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Event::TerminalStarted { task_id, .. }
            | Event::TerminalStdout { task_id, .. }
            | Event::TerminalTimeout { task_id }
            | Event::TerminalKilled { task_id }
            | Event::TerminalExit { task_id, .. }
            | Event::JobClaimRecorded { task_id, .. }
            | Event::JobClaimBlocked { task_id, .. }
            | Event::JobClaimUnblocked { task_id, .. }
            | Event::JobClaimApproved { task_id, .. }
            | Event::JobLocksReleased { task_id, .. }
            | Event::JobTaskCompleted { task_id, .. }
            | Event::JobTaskFailed { task_id, .. } => Some(task_id),
            Event::JobRolesAssigned { .. } => None,
        }
    }

    /// The owning job id, for job-namespace events.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Event::JobClaimRecorded { job_id, .. }
            | Event::JobClaimBlocked { job_id, .. }
            | Event::JobClaimUnblocked { job_id, .. }
            | Event::JobClaimApproved { job_id, .. }
            | Event::JobLocksReleased { job_id, .. }
            | Event::JobTaskCompleted { job_id, .. }
            | Event::JobTaskFailed { job_id, .. }
            | Event::JobRolesAssigned { job_id, .. } => Some(job_id),
            Event::TerminalStarted { .. }
            | Event::TerminalStdout { .. }
            | Event::TerminalTimeout { .. }
            | Event::TerminalKilled { .. }
            | Event::TerminalExit { .. } => None,
        }
    }
}

/// One line of an NDJSON event stream: `{ts, type, payload}`, with the
/// `task_id` carried alongside for job-level streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub ts: f64,
    #[serde(flatten)]
    pub event: Event,
}

impl EventRecord {
    pub fn new(ts_unix_secs: f64, event: Event) -> Self {
        Self { ts: ts_unix_secs, event }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
