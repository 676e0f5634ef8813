// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown task id {0:?}")]
    UnknownTaskId(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("circuit breaker open, not spawning task {task_id:?}")]
    BreakerOpen { task_id: String },

    #[error("failed to spawn task {task_id:?} after retrying: {source}")]
    Spawn { task_id: String, #[source] source: numerus_pty::PtyError },

    #[error(transparent)]
    Pty(#[from] numerus_pty::PtyError),
}
