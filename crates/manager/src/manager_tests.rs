// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use numerus_bus::EventBus;
use serde_json::Map;
use serial_test::serial;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

fn with_env(bin: &str, runs_dir: &std::path::Path, f: impl FnOnce()) {
    std::env::set_var("CODEX_BIN", bin);
    std::env::set_var("MCP_RUNS_DIR", runs_dir);
    f();
    std::env::remove_var("CODEX_BIN");
    std::env::remove_var("MCP_RUNS_DIR");
}

/// `/bin/sleep` can't stand in directly for the agent binary: `create`
/// always invokes `<bin> exec <command>`, and GNU `sleep` rejects a
/// non-numeric first argument instead of ignoring it. This script shifts
/// past `exec` and sleeps for its second argument instead.
fn sleep_script(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("sleep.sh");
    std::fs::write(&path, "#!/bin/sh\nshift\nexec sleep \"$@\"\n").expect("write sleep script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

#[test]
#[serial(env)]
fn create_runs_to_success_and_logs_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env("/bin/echo", dir.path(), || {
        let manager: TerminalManager = TerminalManager::new(EventBus::new());
        manager
            .create("t-success", "hi-there", HashMap::new(), Some(Duration::from_secs(5)), Map::new())
            .expect("create");

        let record = manager
            .wait_until_terminal("t-success", Duration::from_secs(5))
            .expect("wait");
        assert_eq!(record.status, TaskStatus::Succeeded);
        assert_eq!(record.exit_code, Some(0));
        assert!(record.error.is_none());

        let logs = manager.logs("t-success").expect("logs");
        assert!(logs.contains("hi-there"), "logs were: {logs:?}");
    });
}

#[test]
#[serial(env)]
fn create_twice_with_same_task_id_panics() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env("/bin/echo", dir.path(), || {
        let manager: TerminalManager = TerminalManager::new(EventBus::new());
        manager
            .create("dup", "one", HashMap::new(), Some(Duration::from_secs(5)), Map::new())
            .expect("first create");
        manager
            .wait_until_terminal("dup", Duration::from_secs(5))
            .expect("wait");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.create("dup", "two", HashMap::new(), None, Map::new())
        }));
        assert!(result.is_err());
    });
}

#[test]
#[serial(env)]
fn kill_marks_task_failed_with_killed_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sleep = sleep_script(dir.path());
    with_env(&sleep.to_string_lossy(), dir.path(), || {
        let manager: TerminalManager = TerminalManager::new(EventBus::new());
        manager
            .create("t-kill", "5", HashMap::new(), Some(Duration::from_secs(30)), Map::new())
            .expect("create");

        std::thread::sleep(Duration::from_millis(100));
        manager.kill("t-kill");

        let record = manager
            .wait_until_terminal("t-kill", Duration::from_secs(5))
            .expect("wait");
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("killed"));
    });
}

#[test]
fn kill_on_unknown_task_is_a_no_op() {
    let manager: TerminalManager = TerminalManager::new(EventBus::new());
    manager.kill("never-existed");
}

#[test]
#[serial(env)]
fn list_and_status_reflect_running_and_finished_tasks() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env("/bin/echo", dir.path(), || {
        let manager: TerminalManager = TerminalManager::new(EventBus::new());
        manager
            .create("t-a", "alpha", HashMap::new(), Some(Duration::from_secs(5)), Map::new())
            .expect("create a");
        manager
            .create("t-b", "beta", HashMap::new(), Some(Duration::from_secs(5)), Map::new())
            .expect("create b");

        manager.wait_until_terminal("t-a", Duration::from_secs(5)).expect("wait a");
        manager.wait_until_terminal("t-b", Duration::from_secs(5)).expect("wait b");

        assert_eq!(manager.list().len(), 2);
        assert!(manager.status("t-a").is_some());
        assert!(manager.status("nope").is_none());
    });
}

#[test]
#[serial(env)]
fn update_metadata_merges_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    with_env("/bin/echo", dir.path(), || {
        let manager: TerminalManager = TerminalManager::new(EventBus::new());
        manager
            .create("t-meta", "hi", HashMap::new(), Some(Duration::from_secs(5)), Map::new())
            .expect("create");

        let mut fields = Map::new();
        fields.insert("claim".to_string(), serde_json::json!({"ok": true}));
        assert!(manager.update_metadata("t-meta", fields));

        let record = manager.status("t-meta").expect("status");
        assert_eq!(record.metadata.get("claim"), Some(&serde_json::json!({"ok": true})));

        manager.wait_until_terminal("t-meta", Duration::from_secs(5)).expect("wait");
    });
}
