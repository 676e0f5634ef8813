// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded set of reusable [`Session`]s, with acquire/release and a FIFO of
//! idle slots. The "grow on demand" policy itself lives one layer up, in the
//! terminal manager's checkout wrapper, not here.

use crate::error::PtyError;
use crate::session::Session;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub total: usize,
    pub idle: usize,
    pub in_use: usize,
}

struct Slot {
    session: Arc<Session>,
    in_use: bool,
}

struct Inner {
    slots: Vec<Slot>,
    idle_fifo: VecDeque<String>,
}

/// A bounded pool of sessions, identified by session id.
pub struct SessionPool {
    inner: Mutex<Inner>,
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPool {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { slots: Vec::new(), idle_fifo: VecDeque::new() }) }
    }

    /// Add a freshly-opened, idle session to the pool.
    pub fn add(&self, session: Arc<Session>) {
        let mut inner = self.inner.lock();
        let id = session.id().to_string();
        inner.slots.push(Slot { session, in_use: false });
        inner.idle_fifo.push_back(id);
    }

    /// Pop the next idle session off the FIFO. If none is available and
    /// `block` is false, fails immediately with [`PtyError::AcquireTimeout`].
    /// If `block` is true, waits up to `timeout` (polling every 10ms — the
    /// pool holds no session-availability condvar of its own since sessions
    /// are freed from arbitrary watcher threads).
    pub fn acquire(&self, block: bool, timeout: Duration) -> Result<Arc<Session>, PtyError> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut inner = self.inner.lock();
                if let Some(id) = inner.idle_fifo.pop_front() {
                    if let Some(slot) = inner.slots.iter_mut().find(|s| s.session.id() == id) {
                        slot.in_use = true;
                        return Ok(slot.session.clone());
                    }
                }
            }
            let now = Instant::now();
            if !block || now >= deadline {
                return Err(PtyError::AcquireTimeout);
            }
            std::thread::sleep(Duration::from_millis(10).min(deadline - now));
        }
    }

    /// Add a freshly-opened session to the pool already marked in-use, so
    /// the caller that just grew the pool keeps the session it asked for
    /// without a second `acquire` racing another thread for it.
    pub fn add_in_use(&self, session: Arc<Session>) -> Arc<Session> {
        let mut inner = self.inner.lock();
        inner.slots.push(Slot { session: session.clone(), in_use: true });
        session
    }

    /// Return a session to the idle FIFO.
    pub fn release(&self, id: &str) {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.slots.iter_mut().find(|s| s.session.id() == id) {
            slot.in_use = false;
            inner.idle_fifo.push_back(id.to_string());
        }
    }

    /// Remove a session from the pool entirely (called only after `close`).
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.lock();
        inner.slots.retain(|s| s.session.id() != id);
        inner.idle_fifo.retain(|existing| existing != id);
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock();
        let total = inner.slots.len();
        let in_use = inner.slots.iter().filter(|s| s.in_use).count();
        PoolStats { total, idle: total - in_use, in_use }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
