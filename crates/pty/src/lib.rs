// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One reusable pseudo-terminal per [`Session`], drawn from a bounded
//! [`SessionPool`]. Spawns agent child processes, streams their output, and
//! accepts input.

mod error;
mod pool;
mod session;

pub use error::PtyError;
pub use pool::{PoolStats, SessionPool};
pub use session::{Session, SessionConfig};
