// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to allocate pty: {0}")]
    Allocate(String),

    #[error("failed to spawn child in pty: {0}")]
    Spawn(String),

    #[error("failed to write to pty: {0}")]
    Write(String),

    #[error("session is closed")]
    Closed,

    #[error("no pool slot available: {0}")]
    PoolExhausted(String),

    #[error("timed out waiting for a pool slot")]
    AcquireTimeout,

    #[error("unknown session id: {0}")]
    UnknownSession(String),
}
