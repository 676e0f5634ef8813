// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("timed out waiting for topic {topic}")]
    Timeout { topic: String },
}
