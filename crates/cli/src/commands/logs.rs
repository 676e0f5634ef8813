// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logs <task_id> [--follow]`: print or tail `<runs>/<task_id>/stdout.log`.
//! Grounded on `cli/app.py::cmd_logs`; follow mode polls on a fixed interval
//! rather than the original's `readline` loop, since there is no file-watch
//! dependency elsewhere in this workspace worth adding for one command.

use numerus_core::{config, JobStatus};
use numerus_storage::{FileTaskStore, TaskStore};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::time::Duration;

const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(task_id: &str, follow: bool) -> i32 {
    let path = config::runs_dir().join(task_id).join("stdout.log");
    if !path.exists() {
        eprintln!("error: no log file for task {task_id:?}");
        return 1;
    }

    if follow {
        match tail(&path, task_id) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        }
    } else {
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                print!("{content}");
                0
            }
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        }
    }
}

/// Polls `<runs>/<task_id>/stdout.log` for new lines. Once the store reports
/// `task_id`'s job has reached a terminal status, does one final drain and
/// returns instead of following forever.
fn tail(path: &std::path::Path, task_id: &str) -> std::io::Result<()> {
    let store = FileTaskStore::open_default().ok();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::End(0))?;
    loop {
        let mut line = String::new();
        loop {
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            print!("{line}");
            line.clear();
        }

        let job_finished = store
            .as_ref()
            .and_then(|s| s.get(task_id))
            .map(|row| JobStatus::from_store_string(&row.status).is_terminal())
            .unwrap_or(false);
        if job_finished {
            return Ok(());
        }
        std::thread::sleep(FOLLOW_POLL_INTERVAL);
    }
}
