// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hidden `worker` subcommand: what `run`/`start` actually spawn in the
//! background. Loads the job row, builds a manager and job runner, and
//! drives the job to completion while honoring `SIGTERM`.
//!
//! Grounded on `orchestrator/worker.py::main`: same
//! `status=running` → run → `status=succeeded|failed` bookkeeping, same
//! SIGTERM-kills-current-invocation-then-exit-0 contract. `worker.py` relies
//! on the parent's `start_new_session=True` fork to detach; since driving
//! that from Rust would need an `unsafe` `pre_exec` hook between fork and
//! exec (forbidden workspace-wide), this process detaches itself instead by
//! calling `setsid()` on itself as the very first thing it does, which needs
//! no unsafe code because it isn't running between a fork and an exec.

use numerus_bus::EventBus;
use numerus_core::{config, JobStatus};
use numerus_engine::{JobRunner, JobRunnerConfig};
use numerus_manager::TerminalManager;
use numerus_storage::{FileTaskStore, TaskFields, TaskStore};
use std::sync::Arc;
use tracing::warn;

pub fn run(job_id: &str, max_parallel: usize) -> i32 {
    if let Err(e) = nix::unistd::setsid() {
        warn!(job_id = %job_id, error = %e, "setsid failed, worker stays in caller's session");
    }

    match try_run(job_id, max_parallel) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn try_run(job_id: &str, max_parallel: usize) -> anyhow::Result<()> {
    let store = FileTaskStore::open_default()?;
    let row = store.get(job_id).ok_or_else(|| anyhow::anyhow!("unknown job {job_id:?}"))?;

    let job_dir = config::runs_dir().join(job_id);
    std::fs::create_dir_all(&job_dir)?;

    let bus = EventBus::new();
    let manager = Arc::new(TerminalManager::new(bus.clone()));

    store.update_fields(job_id, TaskFields::default().status(JobStatus::Running.as_store_string()))?;

    let mut runner = JobRunner::new(
        job_id,
        row.objective.clone(),
        job_dir,
        manager.as_ref(),
        &store,
        bus,
        JobRunnerConfig { max_parallel, ..JobRunnerConfig::default() },
    )?;

    let current = runner.current_invocation_handle();
    let signal_manager = manager.clone();
    std::thread::spawn(move || {
        let Ok(mut signals) =
            signal_hook::iterator::Signals::new([signal_hook::consts::SIGTERM])
        else {
            return;
        };
        for _ in signals.forever() {
            if let Some(invocation_id) = current.lock().take() {
                signal_manager.kill(&invocation_id);
            }
            std::process::exit(0);
        }
    });

    match runner.run() {
        Ok(()) => {
            store.update_fields(
                job_id,
                TaskFields::default()
                    .status(JobStatus::Succeeded.as_store_string())
                    .exit_code(Some(0)),
            )?;
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            store.update_fields(
                job_id,
                TaskFields::default().status(JobStatus::Failed.as_store_string()).error(Some(message)),
            )?;
            Err(e.into())
        }
    }
}
