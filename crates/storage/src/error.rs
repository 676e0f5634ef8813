// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row for task {0:?} is not valid JSON: {1}")]
    Corrupt(String, serde_json::Error),

    #[error("unknown task id {0:?}")]
    UnknownTaskId(String),
}
