// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task store: one row per job, surviving worker restarts.
//!
//! Persistence is specified only as an interface with a concrete
//! single-table schema, so this crate supplies one concrete, swappable
//! implementation behind the [`TaskStore`] trait rather than leaving it
//! bodyless.
//!
//! [`FileTaskStore`] follows an append-only WAL + materialized-state
//! pattern: every mutation is appended as a JSON-lines record to
//! `$MCP_STORE_PATH`, and an in-memory map replays the file at open time and
//! is kept current thereafter, so `get`/`list` never re-read the file from
//! disk.

mod error;
mod row;

pub use error::StoreError;
pub use row::{TaskFields, TaskRow};

use numerus_core::config;
use numerus_resilience::retry_call;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Operations the core consumes from a task store.
pub trait TaskStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn upsert_task(
        &self,
        task_id: &str,
        objective: &str,
        command: &str,
        status: &str,
        mode: &str,
        worker_pid: Option<u32>,
        exit_code: Option<i32>,
        error: Option<String>,
    ) -> Result<(), StoreError>;

    fn update_fields(&self, task_id: &str, fields: TaskFields) -> Result<(), StoreError>;

    fn get(&self, task_id: &str) -> Option<TaskRow>;

    /// All rows, ordered by `created_at_ms` descending.
    fn list(&self) -> Vec<TaskRow>;
}

/// A single JSON-lines file under `$MCP_STORE_PATH`. Writes are serialized
/// behind a process-wide mutex and wrapped in a retry policy (3 attempts,
/// 0.2s base delay); reads take a separate read-write lock over the
/// materialized map and never touch the file.
pub struct FileTaskStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    rows: RwLock<HashMap<String, TaskRow>>,
}

impl FileTaskStore {
    /// Open (creating if absent) the store at `$MCP_STORE_PATH`, replaying
    /// any existing rows into memory.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(config::store_path())
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rows = if path.exists() { replay(&path)? } else { HashMap::new() };
        Ok(Self { path, write_lock: Mutex::new(()), rows: RwLock::new(rows) })
    }

    fn append(&self, row: &TaskRow) -> Result<(), StoreError> {
        let line = serde_json::to_string(row).expect("TaskRow always serializes");
        let _guard = self.write_lock.lock();
        retry_call(
            || -> Result<(), std::io::Error> {
                let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
                writeln!(f, "{line}")
            },
            config::STORE_RETRY_ATTEMPTS,
            config::STORE_RETRY_BASE_DELAY,
            2.0,
            |_| true,
        )?;
        self.rows.write().insert(row.task_id.clone(), row.clone());
        Ok(())
    }
}

impl TaskStore for FileTaskStore {
    fn upsert_task(
        &self,
        task_id: &str,
        objective: &str,
        command: &str,
        status: &str,
        mode: &str,
        worker_pid: Option<u32>,
        exit_code: Option<i32>,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let now = now_ms();
        let created_at_ms = self.rows.read().get(task_id).map(|r| r.created_at_ms).unwrap_or(now);
        let row = TaskRow {
            task_id: task_id.to_string(),
            objective: objective.to_string(),
            command: command.to_string(),
            status: status.to_string(),
            mode: mode.to_string(),
            created_at_ms,
            updated_at_ms: now,
            worker_pid,
            exit_code,
            error,
        };
        self.append(&row)
    }

    fn update_fields(&self, task_id: &str, fields: TaskFields) -> Result<(), StoreError> {
        let mut row = self
            .rows
            .read()
            .get(task_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTaskId(task_id.to_string()))?;
        fields.apply(&mut row);
        row.updated_at_ms = now_ms();
        self.append(&row)
    }

    fn get(&self, task_id: &str) -> Option<TaskRow> {
        self.rows.read().get(task_id).cloned()
    }

    fn list(&self) -> Vec<TaskRow> {
        let mut rows: Vec<TaskRow> = self.rows.read().values().cloned().collect();
        rows.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        rows
    }
}

/// Replay every JSON-lines record in `path`, keeping the last write per
/// `task_id` (later lines in append order supersede earlier ones).
fn replay(path: &Path) -> Result<HashMap<String, TaskRow>, StoreError> {
    let file = std::fs::File::open(path)?;
    let mut rows = HashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: TaskRow =
            serde_json::from_str(&line).map_err(|e| StoreError::Corrupt(line.clone(), e))?;
        rows.insert(row.task_id.clone(), row);
    }
    Ok(rows)
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
