// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use numerus_bus::EventBus;
use numerus_core::SystemClock;
use serial_test::serial;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;

/// A tiny shell script standing in for the real agent CLI: ignores its
/// `exec <prompt>` arguments entirely and prints fixed stdout.
fn fake_agent(dir: &std::path::Path, stdout: &str) -> std::path::PathBuf {
    let path = dir.join("fake-agent.sh");
    let mut f = std::fs::File::create(&path).expect("create script");
    writeln!(f, "#!/bin/sh").expect("write script");
    writeln!(f, "cat <<'NUMERUS_EOF'").expect("write script");
    writeln!(f, "{stdout}").expect("write script");
    writeln!(f, "NUMERUS_EOF").expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn with_env(bin: &std::path::Path, runs_dir: &std::path::Path, f: impl FnOnce()) {
    std::env::set_var("CODEX_BIN", bin);
    std::env::set_var("MCP_RUNS_DIR", runs_dir);
    f();
    std::env::remove_var("CODEX_BIN");
    std::env::remove_var("MCP_RUNS_DIR");
}

#[test]
#[serial(env)]
fn generate_plan_parses_well_formed_agent_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = fake_agent(
        dir.path(),
        r#"{"objective": "ship it", "tasks": [{"id": "t1", "summary": "Build"}]}"#,
    );
    with_env(&script, dir.path(), || {
        let manager: TerminalManager<SystemClock> = TerminalManager::new(EventBus::new());
        let planner = Planner::new(&manager);
        let plan = planner
            .generate_plan("ship it", "job-1", Duration::from_secs(5))
            .expect("generate_plan");
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].task_id, "t1");
    });
}

#[test]
#[serial(env)]
fn generate_plan_recovers_from_noise_around_the_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = fake_agent(
        dir.path(),
        r#"Sure thing! {"objective": "x", "tasks": [{"id": "t1", "summary": "s"}]} Thanks."#,
    );
    with_env(&script, dir.path(), || {
        let manager: TerminalManager<SystemClock> = TerminalManager::new(EventBus::new());
        let planner = Planner::new(&manager);
        let plan = planner.generate_plan("x", "job-2", Duration::from_secs(5)).expect("generate_plan");
        assert_eq!(plan.tasks.len(), 1);
    });
}

#[test]
#[serial(env)]
fn generate_plan_rejects_empty_task_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = fake_agent(dir.path(), r#"{"objective": "x", "tasks": []}"#);
    with_env(&script, dir.path(), || {
        let manager: TerminalManager<SystemClock> = TerminalManager::new(EventBus::new());
        let planner = Planner::new(&manager);
        let result = planner.generate_plan("x", "job-3", Duration::from_secs(5));
        assert!(matches!(result, Err(PlanError::NoTasks)));
    });
}

#[test]
fn parse_tolerant_json_rejects_empty_input() {
    let result = parse_tolerant_json("   ");
    assert!(matches!(result, Err(PlanError::EmptyOutput)));
}

#[test]
fn parse_tolerant_json_rejects_unbalanced_braces() {
    let result = parse_tolerant_json("no braces here");
    assert!(matches!(result, Err(PlanError::Unparsable)));
}
