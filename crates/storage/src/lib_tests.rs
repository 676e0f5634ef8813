// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn upsert_then_get_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    store
        .upsert_task("job-a", "build the thing", "codex exec ...", "pending", "exec", None, None, None)
        .expect("upsert");

    let row = store.get("job-a").expect("row");
    assert_eq!(row.objective, "build the thing");
    assert_eq!(row.status, "pending");
    assert!(row.created_at_ms > 0);
    assert_eq!(row.created_at_ms, row.updated_at_ms);
}

#[test]
fn upsert_twice_preserves_created_at_and_bumps_updated_at() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    store
        .upsert_task("job-a", "obj", "cmd", "pending", "exec", None, None, None)
        .expect("first upsert");
    let first = store.get("job-a").expect("row").created_at_ms;

    std::thread::sleep(std::time::Duration::from_millis(5));
    store
        .upsert_task("job-a", "obj", "cmd", "running", "exec", Some(123), None, None)
        .expect("second upsert");
    let row = store.get("job-a").expect("row");
    assert_eq!(row.created_at_ms, first);
    assert_eq!(row.status, "running");
    assert_eq!(row.worker_pid, Some(123));
}

#[test]
fn update_fields_only_touches_named_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    store
        .upsert_task("job-a", "obj", "cmd", "pending", "exec", None, None, None)
        .expect("upsert");

    store
        .update_fields("job-a", TaskFields::default().status("failed").error(Some("boom".to_string())))
        .expect("update");

    let row = store.get("job-a").expect("row");
    assert_eq!(row.status, "failed");
    assert_eq!(row.error.as_deref(), Some("boom"));
    assert_eq!(row.objective, "obj", "untouched fields survive");
}

#[test]
fn update_fields_on_unknown_task_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    let result = store.update_fields("nope", TaskFields::default().status("failed"));
    assert!(matches!(result, Err(StoreError::UnknownTaskId(id)) if id == "nope"));
}

#[test]
fn list_orders_by_created_at_descending() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    store.upsert_task("first", "o", "c", "pending", "exec", None, None, None).expect("first");
    std::thread::sleep(std::time::Duration::from_millis(5));
    store.upsert_task("second", "o", "c", "pending", "exec", None, None, None).expect("second");

    let rows = store.list();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].task_id, "second");
    assert_eq!(rows[1].task_id, "first");
}

#[test]
fn reopening_the_store_replays_prior_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tasks.db");
    {
        let store = FileTaskStore::open(&path).expect("open");
        store.upsert_task("job-a", "obj", "cmd", "pending", "exec", None, None, None).expect("upsert");
        store.update_fields("job-a", TaskFields::default().status("succeeded")).expect("update");
    }

    let reopened = FileTaskStore::open(&path).expect("reopen");
    let row = reopened.get("job-a").expect("row survives reopen");
    assert_eq!(row.status, "succeeded");
}

#[test]
fn get_on_unknown_task_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTaskStore::open(dir.path().join("tasks.db")).expect("open");
    assert!(store.get("nope").is_none());
}
