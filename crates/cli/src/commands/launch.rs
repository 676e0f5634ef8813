// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared `run`/`start` launch path: plan the objective, assign roles,
//! persist the job row, and fork the hidden `worker` subcommand to drive it
//! in the background.
//!
//! Grounded on `cli/app.py::_launch_task`: same plan-then-role-then-persist
//! ordering, same `env.setdefault` propagation of `MCP_RUNS_DIR`/
//! `MCP_STORE_PATH`/`CODEX_BIN` to the spawned worker, same `worker_pid`
//! bookkeeping. The Python original forks with `start_new_session=True`;
//! doing that from Rust would need a `pre_exec` hook between fork and exec,
//! which is an `unsafe fn` and the workspace forbids `unsafe_code`. Instead
//! the worker process detaches itself: its first action is its own
//! `nix::unistd::setsid()` call (see `commands::worker::run`), which needs
//! no unsafe code since it isn't running between a fork and an exec.

use numerus_bus::EventBus;
use numerus_core::{config, Clock, Job, JobStatus, SystemClock};
use numerus_manager::TerminalManager;
use numerus_planner::{Planner, RolePlanner};
use numerus_storage::{FileTaskStore, TaskFields, TaskStore};
use std::io::Write;
use std::process::Command;

pub fn prompt_objective() -> anyhow::Result<String> {
    print!("Objective: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let objective = line.trim().to_string();
    if objective.is_empty() {
        anyhow::bail!("no objective given");
    }
    Ok(objective)
}

pub fn run(objective: &str, max_parallel: usize) -> i32 {
    match try_launch(objective, max_parallel) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn try_launch(objective: &str, max_parallel: usize) -> anyhow::Result<i32> {
    // The one place a Job record comes into existence (spec.md §3: "Created
    // when the CLI accepts an objective"). `job.id` is the id threaded
    // through the run directory, the store row, and the worker's argv.
    let job = Job::new(objective, SystemClock.epoch_ms());
    let job_id = job.id;
    std::fs::create_dir_all(config::runs_dir())?;
    let runs_dir = std::fs::canonicalize(config::runs_dir())?;
    let job_dir = runs_dir.join(job_id.as_str());
    std::fs::create_dir_all(&job_dir)?;

    let bus = EventBus::new();
    let planner_manager = TerminalManager::new(bus.clone());
    let planner = Planner::new(&planner_manager);
    let plan = match planner.generate_plan(objective, job_id.as_str(), config::DEFAULT_PLANNER_TIMEOUT) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("error: planning failed: {e}");
            return Ok(1);
        }
    };

    let role_planner = RolePlanner::new(&planner_manager, bus.clone());
    let assignments =
        role_planner.assign(&plan, job_id.as_str(), config::DEFAULT_PLANNER_TIMEOUT)?;

    plan.write_to(&job_dir.join("plan.json"))?;
    let roles: Vec<serde_json::Value> = assignments
        .values()
        .map(|a| serde_json::json!({"id": a.task_id, "role": a.role, "notes": a.notes}))
        .collect();
    std::fs::write(job_dir.join("roles.json"), serde_json::to_string_pretty(&roles)?)?;

    println!("Plan ({} task(s)) -> {}", plan.tasks.len(), job_dir.join("plan.json").display());
    for task in &plan.tasks {
        let role = assignments.get(&task.task_id).map(|a| a.role.as_str()).unwrap_or("unassigned");
        println!("  - {} [{}]: {}", task.task_id, role, task.summary);
    }

    let store = FileTaskStore::open_default()?;
    store.upsert_task(
        job_id.as_str(),
        &job.objective,
        &job.objective,
        &job.status.as_store_string(),
        "exec",
        job.worker_pid,
        job.exit_code,
        job.error.clone(),
    )?;

    if std::env::var_os("MCP_RUNS_DIR").is_none() {
        std::env::set_var("MCP_RUNS_DIR", &runs_dir);
    }
    if std::env::var_os("MCP_STORE_PATH").is_none() {
        std::env::set_var("MCP_STORE_PATH", config::store_path());
    }
    if std::env::var_os("CODEX_BIN").is_none() {
        std::env::set_var("CODEX_BIN", config::codex_bin());
    }

    let current_exe = std::env::current_exe()?;
    let child = Command::new(current_exe)
        .arg("worker")
        .arg(job_id.as_str())
        .arg("--max-parallel")
        .arg(max_parallel.to_string())
        .spawn()?;
    let worker_pid = child.id();
    store.update_fields(
        job_id.as_str(),
        TaskFields::default().worker_pid(Some(worker_pid)).status(JobStatus::Running.as_store_string()),
    )?;

    println!("job {} started", job_id.as_str());
    Ok(0)
}
