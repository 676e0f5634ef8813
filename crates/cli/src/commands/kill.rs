// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kill <task_id>`: SIGTERM the worker process recorded in the store.
//! Grounded on `cli/app.py::cmd_kill`.

use nix::sys::signal::{kill as send_signal, Signal};
use nix::unistd::Pid;
use numerus_core::JobStatus;
use numerus_storage::{FileTaskStore, TaskFields, TaskStore};

pub fn run(task_id: &str) -> i32 {
    let store = match FileTaskStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let Some(row) = store.get(task_id) else {
        eprintln!("error: unknown job {task_id:?}");
        return 1;
    };

    let Some(pid) = row.worker_pid else {
        eprintln!("error: job {task_id:?} has no recorded worker pid");
        return 1;
    };

    match send_signal(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => {
            if let Err(e) = store.update_fields(
                task_id,
                TaskFields::default().status(JobStatus::Terminating.as_store_string()),
            ) {
                eprintln!("error: {e}");
                return 1;
            }
            println!("Sent SIGTERM to job {task_id} (pid {pid})");
            0
        }
        Err(e) => {
            eprintln!("error: worker process {pid} missing: {e}");
            1
        }
    }
}
