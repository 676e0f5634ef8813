// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial(env)]
fn runs_dir_defaults_when_unset() {
    std::env::remove_var("MCP_RUNS_DIR");
    assert_eq!(runs_dir(), PathBuf::from("runs"));
}

#[test]
#[serial(env)]
fn runs_dir_honors_env_override() {
    std::env::set_var("MCP_RUNS_DIR", "/tmp/custom-runs");
    assert_eq!(runs_dir(), PathBuf::from("/tmp/custom-runs"));
    std::env::remove_var("MCP_RUNS_DIR");
}

#[test]
#[serial(env)]
fn store_path_defaults_when_unset() {
    std::env::remove_var("MCP_STORE_PATH");
    assert_eq!(store_path(), PathBuf::from("store/tasks.db"));
}

#[test]
#[serial(env)]
fn codex_bin_defaults_to_codex() {
    std::env::remove_var("CODEX_BIN");
    assert_eq!(codex_bin(), "codex");
}

#[test]
#[serial(env)]
fn codex_bin_honors_env_override() {
    std::env::set_var("CODEX_BIN", "/usr/local/bin/codex-nightly");
    assert_eq!(codex_bin(), "/usr/local/bin/codex-nightly");
    std::env::remove_var("CODEX_BIN");
}
