// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job runner: dependency scheduler, claim/execute state machine, lock
//! arbiter, and deadlock detector. Grounded line-for-line on
//! `orchestrator/job_runner.py` for control flow — the `break`-and-restart
//! behavior, the blocked/completed set bookkeeping, the
//! deadlock-is-logged-then-fatal treatment.
//!
//! This dispatcher runs tasks serially by design, but the lock table,
//! blocked/unblocked events, and deadlock detector are built as if for
//! parallel dispatch. The `max_parallel` value is threaded down from the CLI
//! and recorded, unused, as the visible seam a future parallel dispatcher
//! would extract the inner loop behind.

use crate::claim::Claim;
use crate::error::RuntimeError;
use crate::locks::ResourceLocks;
use numerus_bus::EventBus;
use numerus_core::{config, Event, EventRecord, JobStatus};
use numerus_manager::{TaskStatus, TerminalManager};
use numerus_planner::{parse_tolerant_json, Plan, PlanTask};
use numerus_storage::{TaskFields, TaskStore};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct JobRunnerConfig {
    pub analysis_timeout: Duration,
    pub execution_timeout: Duration,
    pub max_parallel: usize,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            analysis_timeout: config::DEFAULT_ANALYSIS_TIMEOUT,
            execution_timeout: config::DEFAULT_EXECUTION_TIMEOUT,
            max_parallel: 1,
        }
    }
}

pub struct JobRunner<'a> {
    job_id: String,
    objective: String,
    job_dir: PathBuf,
    manager: &'a TerminalManager,
    store: &'a dyn TaskStore,
    bus: EventBus,
    config: JobRunnerConfig,

    remaining: Vec<PlanTask>,
    claims: HashMap<String, Claim>,
    completed: HashSet<String>,
    blocked: HashSet<String>,
    locks: ResourceLocks,
    current: Arc<Mutex<Option<String>>>,
}

impl<'a> JobRunner<'a> {
    /// Loads `<job_dir>/plan.json`; a missing plan is fatal.
    pub fn new(
        job_id: impl Into<String>,
        objective: impl Into<String>,
        job_dir: impl Into<PathBuf>,
        manager: &'a TerminalManager,
        store: &'a dyn TaskStore,
        bus: EventBus,
        config: JobRunnerConfig,
    ) -> Result<Self, RuntimeError> {
        let job_dir = job_dir.into();
        let plan_path = job_dir.join("plan.json");
        if !plan_path.exists() {
            return Err(RuntimeError::MissingPlan(plan_path));
        }
        let plan = Plan::read_from(&plan_path)?;
        validate_dag(&plan)?;

        Ok(Self {
            job_id: job_id.into(),
            objective: objective.into(),
            job_dir,
            manager,
            store,
            bus,
            config,
            remaining: plan.tasks,
            claims: HashMap::new(),
            completed: HashSet::new(),
            blocked: HashSet::new(),
            locks: ResourceLocks::new(),
            current: Arc::new(Mutex::new(None)),
        })
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    /// A handle to the id of whichever invocation is currently running, if
    /// any. A SIGTERM handler reads this to find what to `kill()` via the
    /// manager before exiting with status 0.
    pub fn current_invocation_handle(&self) -> Arc<Mutex<Option<String>>> {
        self.current.clone()
    }

    /// Runs the dispatcher to completion. Returns `Ok(())` once every task
    /// has completed; any per-task failure or deadlock aborts the whole job.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            if self.remaining.is_empty() {
                return Ok(());
            }

            let mut progress = false;
            let mut index = 0;
            while index < self.remaining.len() {
                let task = self.remaining[index].clone();

                if !task.dependencies.iter().all(|d| self.completed.contains(d)) {
                    index += 1;
                    continue;
                }

                if !self.claims.contains_key(&task.task_id) {
                    let claim = self.analyze(&task)?;
                    self.persist_claim(&claim)?;
                    self.emit_job_event(Event::JobClaimRecorded {
                        job_id: self.job_id.clone(),
                        task_id: task.task_id.clone(),
                    });
                    self.claims.insert(task.task_id.clone(), claim);
                }
                let claim = self.claims.get(&task.task_id).expect("just inserted").clone();

                if !self.locks.can_lock(&task.task_id, &claim.writes) {
                    if self.blocked.insert(task.task_id.clone()) {
                        self.store.update_fields(
                            &self.job_id,
                            TaskFields::default().status(
                                JobStatus::Blocked { task_id: task.task_id.clone() }
                                    .as_store_string(),
                            ),
                        )?;
                        self.emit_job_event(Event::JobClaimBlocked {
                            job_id: self.job_id.clone(),
                            task_id: task.task_id.clone(),
                        });
                        warn!(task_id = %task.task_id, "claim blocked on held write path");
                    }
                    index += 1;
                    continue;
                }
                if self.blocked.remove(&task.task_id) {
                    self.emit_job_event(Event::JobClaimUnblocked {
                        job_id: self.job_id.clone(),
                        task_id: task.task_id.clone(),
                    });
                }

                self.locks.acquire(&task.task_id, &claim.writes);
                self.emit_job_event(Event::JobClaimApproved {
                    job_id: self.job_id.clone(),
                    task_id: task.task_id.clone(),
                });

                let outcome = self.execute(&task, &claim);

                self.locks.release(&task.task_id);
                self.emit_job_event(Event::JobLocksReleased {
                    job_id: self.job_id.clone(),
                    task_id: task.task_id.clone(),
                });

                outcome?;

                self.completed.insert(task.task_id.clone());
                self.remaining.remove(index);
                progress = true;
                break;
            }

            if !progress {
                std::thread::sleep(config::DISPATCHER_BACKOFF);
                let all_satisfied = self
                    .remaining
                    .iter()
                    .all(|t| t.dependencies.iter().all(|d| self.completed.contains(d)));
                if all_satisfied {
                    error!(job_id = %self.job_id, "deadlock: no remaining task could make progress");
                    return Err(RuntimeError::Deadlock);
                }
            }
        }
    }

    /// §4.I.1 ANALYZE(task): runs the claim-phase agent invocation and
    /// parses its JSON answer into a [`Claim`].
    fn analyze(&self, task: &PlanTask) -> Result<Claim, RuntimeError> {
        self.store.update_fields(
            &self.job_id,
            TaskFields::default()
                .status(JobStatus::Analysis { task_id: task.task_id.clone() }.as_store_string()),
        )?;

        let prompt = claim_prompt(&self.objective, task);
        let invocation_id = format!("claim-{}-{}", self.job_id, task.task_id);
        *self.current.lock() = Some(invocation_id.clone());
        self.manager.create(
            invocation_id.as_str(),
            prompt,
            HashMap::new(),
            Some(self.config.analysis_timeout),
            serde_json::Map::new(),
        )?;
        let record = self.manager.wait_until_terminal(
            &invocation_id,
            self.config.analysis_timeout + Duration::from_secs(5),
        )?;
        if record.status != TaskStatus::Succeeded {
            return Err(RuntimeError::TaskFailed {
                task_id: task.task_id.clone(),
                reason: record.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let stdout = self.manager.logs(&invocation_id)?;
        let value = parse_tolerant_json(&stdout)
            .map_err(|_| RuntimeError::UnparsableClaim(task.task_id.clone()))?;
        let mut fields = serde_json::Map::new();
        fields.insert("claim".to_string(), value.clone());
        self.manager.update_metadata(&invocation_id, fields);
        *self.current.lock() = None;

        info!(task_id = %task.task_id, "claim recorded");
        Ok(Claim::from_value(&task.task_id, &value, task))
    }

    /// §4.I.2 EXECUTE(task, claim): runs the execute-phase agent invocation
    /// under `APPROVAL: GO` with the claim's resources inlined.
    fn execute(&self, task: &PlanTask, claim: &Claim) -> Result<(), RuntimeError> {
        self.store.update_fields(
            &self.job_id,
            TaskFields::default().status(
                JobStatus::AwaitingExec { task_id: task.task_id.clone() }.as_store_string(),
            ),
        )?;

        let prompt = execute_prompt(&self.objective, task, claim);
        let invocation_id = format!("exec-{}-{}", self.job_id, task.task_id);
        *self.current.lock() = Some(invocation_id.clone());
        let mut metadata = serde_json::Map::new();
        metadata.insert("claim".to_string(), claim.to_value());
        self.manager.create(
            invocation_id.as_str(),
            prompt,
            HashMap::new(),
            Some(self.config.execution_timeout),
            metadata,
        )?;
        let record = self.manager.wait_until_terminal(
            &invocation_id,
            self.config.execution_timeout + Duration::from_secs(5),
        )?;

        if record.status != TaskStatus::Succeeded {
            let reason = record.error.unwrap_or_else(|| "unknown error".to_string());
            self.emit_job_event(Event::JobTaskFailed {
                job_id: self.job_id.clone(),
                task_id: task.task_id.clone(),
                error: reason.clone(),
            });
            return Err(RuntimeError::TaskFailed { task_id: task.task_id.clone(), reason });
        }

        self.store.update_fields(
            &self.job_id,
            TaskFields::default()
                .status(JobStatus::Executed { task_id: task.task_id.clone() }.as_store_string()),
        )?;
        *self.current.lock() = None;
        let stdout_log_path = format!("{}/stdout.log", invocation_id);
        self.emit_job_event(Event::JobTaskCompleted {
            job_id: self.job_id.clone(),
            task_id: task.task_id.clone(),
            stdout_log_path,
        });
        info!(task_id = %task.task_id, "task completed");
        Ok(())
    }

    fn persist_claim(&self, claim: &Claim) -> Result<(), RuntimeError> {
        let path = self.job_dir.join(format!("{}_claim.json", claim.task_id));
        Ok(claim.write_to(&path)?)
    }

    /// Appends to `<runs>/<job>/events.ndjson` and republishes on the bus
    /// under `job.<name>`, mirroring the manager's per-invocation event
    /// recording under `terminal.<name>` (the same two-stream event model).
    fn emit_job_event(&self, event: Event) {
        let path = self.job_dir.join("events.ndjson");
        let record = EventRecord::new(now_epoch_secs(), event.clone());
        if let Ok(line) = serde_json::to_string(&record) {
            if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&path) {
                let _ = writeln!(f, "{line}");
            }
        }
        self.bus.emit(event.topic(), event);
    }
}

fn now_epoch_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// The dependency graph is a DAG; unknown dependency ids are a planning
/// error.
fn validate_dag(plan: &Plan) -> Result<(), RuntimeError> {
    let ids: HashSet<&str> = plan.tasks.iter().map(|t| t.task_id.as_str()).collect();
    for task in &plan.tasks {
        for dep in &task.dependencies {
            if !ids.contains(dep.as_str()) {
                return Err(RuntimeError::UnknownDependency {
                    task_id: task.task_id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn claim_prompt(objective: &str, task: &PlanTask) -> String {
    format!(
        "NUMERUS_CLAIM V1. OBJECTIVE: {objective}. TASK: {} ({}). {}\n\
         Declared reads: {:?}. Declared writes: {:?}.\n\
         Return JSON only: {{\"task_id\": string, \"resources\": {{\"reads\": [string], \
         \"writes\": [string]}}, \"execution\": {{\"commands\": [string]}}}}.",
        task.task_id, task.summary, task.description, task.reads, task.writes,
    )
}

fn execute_prompt(objective: &str, task: &PlanTask, claim: &Claim) -> String {
    let resources = serde_json::json!({ "reads": claim.reads, "writes": claim.writes });
    format!(
        "NUMERUS_EXEC V1. APPROVAL: GO. OBJECTIVE: {objective}. TASK: {} ({}).\n\
         RESOURCES: {resources}\nCOMMANDS: {:?}\nCarry out the task now.",
        task.task_id, task.summary, claim.commands,
    )
}

#[cfg(test)]
#[path = "job_runner_tests.rs"]
mod tests;
