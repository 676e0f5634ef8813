// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_job_starts_pending() {
    let job = Job::new("build a thing", 1_000);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.created_at_ms, job.updated_at_ms);
    assert!(job.worker_pid.is_none());
}

#[test]
fn store_string_round_trips_parameterized_variants() {
    let cases = [
        (JobStatus::Pending, "pending"),
        (JobStatus::Running, "running"),
        (JobStatus::Analysis { task_id: "build-api".into() }, "analysis:build-api"),
        (JobStatus::AwaitingExec { task_id: "build-api".into() }, "awaiting_exec:build-api"),
        (JobStatus::Executed { task_id: "build-api".into() }, "executed:build-api"),
        (JobStatus::Blocked { task_id: "build-api".into() }, "blocked:build-api"),
        (JobStatus::Succeeded, "succeeded"),
        (JobStatus::Failed, "failed"),
        (JobStatus::Terminating, "terminating"),
    ];
    for (status, expected) in cases {
        assert_eq!(status.as_store_string(), expected);
        assert_eq!(JobStatus::from_store_string(expected), status);
    }
}

#[test]
fn task_id_containing_colon_is_preserved_after_first_split() {
    let status = JobStatus::from_store_string("analysis:a:b");
    assert_eq!(status, JobStatus::Analysis { task_id: "a:b".into() });
}

#[test]
fn terminal_statuses() {
    assert!(JobStatus::Succeeded.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
    assert!(!JobStatus::Running.is_terminal());
    assert!(!JobStatus::Terminating.is_terminal());
}
