// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

fn echo_config() -> SessionConfig {
    // `/bin/echo exec <arg>` matches the `<bin> exec <command>` invocation
    // shape while using a real, always-present binary as the stand-in agent.
    SessionConfig {
        bin: "/bin/echo".to_string(),
        workdir: std::env::temp_dir(),
        env: HashMap::new(),
        timeout: Some(Duration::from_secs(5)),
    }
}

/// `/bin/sleep` itself can't stand in for the agent binary here: `spawn_exec`
/// always prepends `exec` as argv[1], and GNU `sleep` rejects a non-numeric
/// first argument instead of ignoring it. This script shifts past `exec` and
/// sleeps for its second argument instead.
fn sleep_script() -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("numerus-pty-test-sleep-{}.sh", std::process::id()));
    std::fs::write(&path, "#!/bin/sh\nshift\nexec sleep \"$@\"\n").expect("write sleep script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

#[test]
fn open_allocates_a_pty_and_is_not_closed() {
    let session = Session::open("ses-1").expect("open session");
    assert_eq!(session.id(), "ses-1");
    assert!(!session.is_closed());
}

#[test]
fn spawn_exec_runs_and_exits() {
    let session = Session::open("ses-2").expect("open session");
    session.configure(echo_config());
    session.spawn_exec("hello-from-session").expect("spawn");
    let code = session.wait();
    assert_eq!(code, Some(0));
}

#[test]
fn spawning_while_previous_child_alive_panics() {
    let session = Session::open("ses-3").expect("open session");
    session.configure(SessionConfig {
        bin: sleep_script().to_string_lossy().into_owned(),
        workdir: std::env::temp_dir(),
        env: HashMap::new(),
        timeout: None,
    });
    session.spawn_exec("2").expect("spawn sleep");
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        session.spawn_exec("2")
    }));
    assert!(result.is_err());
    session.terminate();
}

#[test]
fn close_is_idempotent() {
    let session = Session::open("ses-4").expect("open session");
    session.close();
    assert!(session.is_closed());
    session.close();
    assert!(session.is_closed());
}

#[test]
fn write_after_close_fails_gracefully() {
    let session = Session::open("ses-5").expect("open session");
    session.close();
    // write() doesn't check `closed` itself (the writer handle is still
    // valid until dropped); spawn_exec is the operation that must refuse.
    let result = session.spawn_exec("anything");
    assert!(matches!(result, Err(PtyError::Closed)));
}

#[test]
fn read_returns_empty_string_on_timeout_with_no_output() {
    let session = Session::open("ses-6").expect("open session");
    let out = session.read(Duration::from_millis(50));
    assert_eq!(out, "");
}
