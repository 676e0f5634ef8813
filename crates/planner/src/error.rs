// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner task {task_id:?} failed: {reason}")]
    Failed { task_id: String, reason: String },

    #[error("planner produced no output")]
    EmptyOutput,

    #[error("planner output was not valid JSON")]
    Unparsable,

    #[error("plan must contain at least one task")]
    NoTasks,

    #[error(transparent)]
    Manager(#[from] numerus_manager::ManagerError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
