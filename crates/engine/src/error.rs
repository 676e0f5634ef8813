// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("plan.json not found at {0}")]
    MissingPlan(std::path::PathBuf),

    #[error(transparent)]
    Plan(#[from] numerus_planner::PlanError),

    #[error(transparent)]
    Manager(#[from] numerus_manager::ManagerError),

    #[error(transparent)]
    Store(#[from] numerus_storage::StoreError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("claim for task {0:?} was not valid JSON")]
    UnparsableClaim(String),

    #[error("task {task_id:?} failed: {reason}")]
    TaskFailed { task_id: String, reason: String },

    #[error(
        "deadlock: every remaining task has satisfied dependencies but none could acquire its locks"
    )]
    Deadlock,

    #[error("plan references unknown dependency {dependency:?} from task {task_id:?}")]
    UnknownDependency { task_id: String, dependency: String },
}
