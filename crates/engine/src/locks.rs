// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resource lock table: mapping from a normalized write path to the
//! task id currently holding it. Paths are compared lexically after POSIX
//! normalization only; no symlink resolution. A task's reads are
//! informational and are NOT locked; only writes acquire, and acquisition is
//! all-or-nothing.
//!
//! Accessed only from the dispatcher thread in this serial dispatcher, so it
//! carries no internal locking of its own — a future parallel dispatcher
//! would need to wrap it.

use std::collections::HashMap;

/// Lexically normalize a POSIX-style path: split on `/`, drop `.` segments,
/// pop the parent on `..`, without touching the filesystem (no
/// `canonicalize`, no symlink resolution).
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[derive(Debug, Default)]
pub struct ResourceLocks {
    owners: HashMap<String, String>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self { owners: HashMap::new() }
    }

    /// True iff every path in `writes` is either free or already held by
    /// `task_id` itself.
    pub fn can_lock(&self, task_id: &str, writes: &[String]) -> bool {
        writes
            .iter()
            .map(|p| normalize(p))
            .all(|p| self.owners.get(&p).map(|owner| owner == task_id).unwrap_or(true))
    }

    /// Acquire every path in `writes` for `task_id`. Caller must have
    /// already confirmed `can_lock`; acquisition is all-or-nothing only in
    /// the sense that the caller checks first, not that this call rolls
    /// back partial state (the dispatcher never calls it otherwise).
    pub fn acquire(&mut self, task_id: &str, writes: &[String]) {
        for path in writes {
            self.owners.insert(normalize(path), task_id.to_string());
        }
    }

    /// Release every path currently held by `task_id`.
    pub fn release(&mut self, task_id: &str) {
        self.owners.retain(|_, owner| owner != task_id);
    }

    /// The task id currently holding `path`, if any (test/inspection use).
    pub fn holder(&self, path: &str) -> Option<&str> {
        self.owners.get(&normalize(path)).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
