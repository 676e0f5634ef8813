// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checks out sessions from a pool, spawns agent invocations into them, and
//! hands back [`TaskRecord`]s that a dedicated watcher thread keeps current
//! until the invocation reaches a terminal status.
//!
//! Lifecycle: checkout (grow on
//! demand) -> breaker-guarded retry spawn -> record + emit `started` -> spawn
//! watcher -> wait/close/release -> stamp terminal status. `kill` fully
//! finalizes on its own (terminate, close, remove, stamp, emit `killed`) and
//! races the watcher thread for a single `finalized` flag so whichever side
//! gets there first is the only one that stamps the record and the other
//! becomes a no-op; this also gates the watcher off from emitting any
//! further events once killed.

use crate::error::ManagerError;
use crate::record::{TaskMode, TaskRecord, TaskStatus};
use numerus_bus::EventBus;
use numerus_core::config;
use numerus_core::{Clock, Event, EventRecord, SystemClock};
use numerus_pty::{Session, SessionConfig, SessionPool};
use numerus_resilience::{retry_call, CircuitBreaker};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const BREAKER_THRESHOLD: u32 = 5;
const BREAKER_COOLDOWN: Duration = Duration::from_secs(30);

/// One invocation's mutable bookkeeping, shared between the caller of
/// `create` and its watcher thread.
struct TaskEntry<C: Clock> {
    task_id: String,
    record: Mutex<TaskRecord>,
    session: Arc<Session>,
    clock: C,
    timed_out: AtomicBool,
    finalized: AtomicBool,
    done: Mutex<bool>,
    done_cv: Condvar,
}

impl<C: Clock> TaskEntry<C> {
    fn signal_done(&self) {
        *self.done.lock() = true;
        self.done_cv.notify_all();
    }
}

/// A duplicated-in-spirit handle to a running invocation's pty, for
/// interactive use outside the watcher's own read loop.
pub struct Attachment {
    session: Arc<Session>,
    reader: Box<dyn Read + Send>,
}

impl Attachment {
    pub fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }

    pub fn write(&self, bytes: &[u8]) -> Result<(), numerus_pty::PtyError> {
        self.session.write(bytes)
    }
}

/// Concrete terminal manager. One PTY-backed implementation, not a trait
/// with adapters.
pub struct TerminalManager<C: Clock = SystemClock> {
    bus: EventBus,
    pool: Arc<SessionPool>,
    breaker: CircuitBreaker<C>,
    clock: C,
    runs_dir: PathBuf,
    tasks: Mutex<HashMap<String, Arc<TaskEntry<C>>>>,
}

impl TerminalManager<SystemClock> {
    pub fn new(bus: EventBus) -> Self {
        Self::with_clock(bus, SystemClock)
    }
}

impl<C: Clock + 'static> TerminalManager<C> {
    pub fn with_clock(bus: EventBus, clock: C) -> Self {
        Self {
            bus,
            pool: Arc::new(SessionPool::new()),
            breaker: CircuitBreaker::new(BREAKER_THRESHOLD, BREAKER_COOLDOWN, clock.clone()),
            clock,
            runs_dir: config::runs_dir(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Runs the full six-step create sequence and returns once the
    /// invocation is recorded and its watcher thread is running. `mode` is
    /// always `exec`; there is no other mode to select.
    pub fn create(
        &self,
        task_id: impl Into<String>,
        command: impl Into<String>,
        env: HashMap<String, String>,
        timeout: Option<Duration>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<TaskRecord, ManagerError> {
        let task_id = task_id.into();
        let command = command.into();
        assert!(
            !self.tasks.lock().contains_key(&task_id),
            "TerminalManager::create called twice with task id {task_id:?}"
        );

        // Step 1: materialize <runs>/<task_id>/ with stdout.log and events.ndjson.
        let workdir = self.runs_dir.join(&task_id);
        std::fs::create_dir_all(&workdir)?;
        let stdout_path = workdir.join("stdout.log");
        let events_path = workdir.join("events.ndjson");
        OpenOptions::new().create(true).append(true).open(&stdout_path)?;
        OpenOptions::new().create(true).append(true).open(&events_path)?;

        // Step 2: checkout a session, growing the pool on demand.
        let session = self.checkout()?;
        session.configure(SessionConfig {
            bin: config::codex_bin(),
            workdir: workdir.clone(),
            env,
            timeout,
        });

        // Step 3: breaker-guarded retry spawn.
        if self.breaker.allow().is_err() {
            self.pool.release(session.id());
            return Err(ManagerError::BreakerOpen { task_id });
        }
        match retry_call(
            || session.spawn_exec(&command),
            config::SPAWN_RETRY_ATTEMPTS,
            config::SPAWN_RETRY_BASE_DELAY,
            2.0,
            |_| true,
        ) {
            Ok(()) => self.breaker.record_success(),
            Err(source) => {
                self.breaker.record_failure();
                session.close();
                self.pool.remove(session.id());
                return Err(ManagerError::Spawn { task_id, source });
            }
        }

        // Step 4: record the task and emit `started`.
        let start_ms = self.clock.epoch_ms();
        let record = TaskRecord {
            task_id: task_id.clone(),
            workdir: workdir.clone(),
            status: TaskStatus::Running,
            start_ms,
            end_ms: None,
            exit_code: None,
            mode: TaskMode::Exec,
            command: command.clone(),
            error: None,
            metadata,
        };
        let entry = Arc::new(TaskEntry {
            task_id: task_id.clone(),
            record: Mutex::new(record.clone()),
            session: session.clone(),
            clock: self.clock.clone(),
            timed_out: AtomicBool::new(false),
            finalized: AtomicBool::new(false),
            done: Mutex::new(false),
            done_cv: Condvar::new(),
        });
        self.tasks.lock().insert(task_id.clone(), entry.clone());

        record_event(
            &self.bus,
            &events_path,
            self.clock.epoch_ms(),
            Event::TerminalStarted { task_id: task_id.clone(), command: command.clone() },
        );
        info!(task_id = %task_id, "task started");

        // Step 5: launch the watcher thread.
        spawn_watcher(entry, self.bus.clone(), self.pool.clone(), stdout_path, events_path, timeout);

        Ok(record)
    }

    /// Pop an idle session off the pool's FIFO; if none is available without
    /// blocking, open a brand-new one and add it to the pool already
    /// checked out (grow on demand).
    fn checkout(&self) -> Result<Arc<Session>, ManagerError> {
        match self.pool.acquire(false, Duration::from_millis(1)) {
            Ok(session) => Ok(session),
            Err(_) => {
                let id = format!("ses-{}", nanoid::nanoid!(8));
                let session = Arc::new(Session::open(id)?);
                Ok(self.pool.add_in_use(session))
            }
        }
    }

    /// Terminate the child, close and remove its session, flag the
    /// TaskRecord failed with error `killed`, emit `killed`. Safe to call on
    /// an unknown or already-finished task.
    pub fn kill(&self, task_id: &str) {
        let Some(entry) = self.tasks.lock().get(task_id).cloned() else {
            return;
        };
        if entry.record.lock().status != TaskStatus::Running {
            return;
        }
        if entry.finalized.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return;
        }

        entry.session.terminate();
        entry.session.close();
        self.pool.remove(entry.session.id());

        let events_path = {
            let mut record = entry.record.lock();
            record.status = TaskStatus::Failed;
            record.error = Some("killed".to_string());
            record.end_ms = Some(entry.clock.epoch_ms());
            record.workdir.join("events.ndjson")
        };
        record_event(
            &self.bus,
            &events_path,
            entry.clock.epoch_ms(),
            Event::TerminalKilled { task_id: task_id.to_string() },
        );
        warn!(task_id, "task killed");
        entry.signal_done();
    }

    pub fn status(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks.lock().get(task_id).map(|e| e.record.lock().clone())
    }

    pub fn list(&self) -> Vec<TaskRecord> {
        self.tasks.lock().values().map(|e| e.record.lock().clone()).collect()
    }

    pub fn update_metadata(&self, task_id: &str, fields: serde_json::Map<String, serde_json::Value>) -> bool {
        let Some(entry) = self.tasks.lock().get(task_id).cloned() else {
            return false;
        };
        entry.record.lock().metadata.extend(fields);
        true
    }

    /// The verbatim contents of `stdout.log` so far.
    pub fn logs(&self, task_id: &str) -> Result<String, ManagerError> {
        let record = self
            .status(task_id)
            .ok_or_else(|| ManagerError::UnknownTaskId(task_id.to_string()))?;
        Ok(std::fs::read_to_string(record.workdir.join("stdout.log"))?)
    }

    pub fn attach(&self, task_id: &str) -> Result<Attachment, ManagerError> {
        let entry = self
            .tasks
            .lock()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownTaskId(task_id.to_string()))?;
        let reader = entry.session.clone_reader()?;
        Ok(Attachment { session: entry.session.clone(), reader })
    }

    pub fn send(&self, task_id: &str, text: &str) -> Result<(), ManagerError> {
        let entry = self
            .tasks
            .lock()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownTaskId(task_id.to_string()))?;
        Ok(entry.session.write(text.as_bytes())?)
    }

    /// Block until `task_id` reaches a terminal status or `timeout` elapses,
    /// returning whatever the record looks like at that point. A condvar
    /// replaces the source's raw 200ms poll loop; the poll interval is kept
    /// as a belt-and-braces wakeup in case a signal is ever missed.
    pub fn wait_until_terminal(&self, task_id: &str, timeout: Duration) -> Result<TaskRecord, ManagerError> {
        let entry = self
            .tasks
            .lock()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownTaskId(task_id.to_string()))?;
        let deadline = Instant::now() + timeout;
        let mut done = entry.done.lock();
        while !*done {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait_for = config::POLL_INTERVAL.min(deadline - now);
            entry.done_cv.wait_for(&mut done, wait_for);
        }
        Ok(entry.record.lock().clone())
    }
}

fn spawn_watcher<C: Clock + 'static>(
    entry: Arc<TaskEntry<C>>,
    bus: EventBus,
    pool: Arc<SessionPool>,
    stdout_path: PathBuf,
    events_path: PathBuf,
    timeout: Option<Duration>,
) {
    std::thread::spawn(move || {
        let deadline = timeout.map(|t| entry.clock.now() + t);
        loop {
            if entry.finalized.load(Ordering::SeqCst) {
                return;
            }

            if let Some(deadline) = deadline {
                if entry.clock.now() >= deadline && !entry.timed_out.swap(true, Ordering::SeqCst) {
                    entry.session.terminate();
                    record_event(
                        &bus,
                        &events_path,
                        entry.clock.epoch_ms(),
                        Event::TerminalTimeout { task_id: entry.task_id.clone() },
                    );
                }
            }

            let chunk = entry.session.read(config::WATCHER_READ_BUDGET);
            if !chunk.is_empty() {
                append_stdout(&stdout_path, &chunk);
                record_event(
                    &bus,
                    &events_path,
                    entry.clock.epoch_ms(),
                    Event::TerminalStdout { task_id: entry.task_id.clone(), chunk: chunk.clone() },
                );
            }

            if let Some(exit_code) = entry.session.try_wait() {
                if chunk.is_empty() {
                    finalize_exit(&entry, &bus, &pool, &events_path, exit_code);
                    return;
                }
            }
        }
    });
}

fn finalize_exit<C: Clock>(
    entry: &Arc<TaskEntry<C>>,
    bus: &EventBus,
    pool: &SessionPool,
    events_path: &Path,
    exit_code: u32,
) {
    if entry.finalized.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
        return;
    }
    entry.session.wait();
    pool.release(entry.session.id());

    let timed_out = entry.timed_out.load(Ordering::SeqCst);
    let error = if timed_out {
        Some("timeout".to_string())
    } else if exit_code != 0 {
        Some(format!("exit_code={exit_code}"))
    } else {
        None
    };
    let status = if error.is_none() { TaskStatus::Succeeded } else { TaskStatus::Failed };

    {
        let mut record = entry.record.lock();
        record.status = status;
        record.end_ms = Some(entry.clock.epoch_ms());
        record.exit_code = Some(exit_code as i32);
        record.error = error.clone();
    }
    record_event(
        bus,
        events_path,
        entry.clock.epoch_ms(),
        Event::TerminalExit { task_id: entry.task_id.clone(), exit_code: Some(exit_code as i32), error },
    );
    entry.signal_done();
}

fn append_stdout(path: &Path, chunk: &str) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = f.write_all(chunk.as_bytes());
    }
}

/// Append one NDJSON line and republish the same event on the bus under its
/// `terminal.<name>` topic. Reopens the file by path on every call since
/// exactly one watcher thread ever writes a given invocation's stream.
fn record_event(bus: &EventBus, events_path: &Path, epoch_ms: u64, event: Event) {
    let record = EventRecord::new(epoch_ms as f64 / 1000.0, event.clone());
    if let Ok(line) = serde_json::to_string(&record) {
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(events_path) {
            let _ = writeln!(f, "{line}");
        }
    }
    bus.emit(event.topic(), event);
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
