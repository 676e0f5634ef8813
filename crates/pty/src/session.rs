// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single reusable pseudo-terminal, built on `portable-pty`. Adapted from
//! a single-shot session to an open-once/spawn-repeatedly lifecycle: one PTY
//! pair hosts a succession of child agent invocations over its life.
//!
//! The workspace forbids `unsafe_code`, so unlike a raw-fd implementation
//! this never sets the pty fd non-blocking directly. Instead `open()` spawns
//! one long-lived background thread per session that performs blocking reads
//! off a cloned reader and forwards chunks over a channel; `read(timeout)`
//! is a bounded `recv_timeout` against that channel — the safe-Rust
//! equivalent of a `select`-with-timeout loop.

use crate::error::PtyError;
use numerus_core::config::WATCHER_READ_CHUNK_BYTES;
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize, SlavePty};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub bin: String,
    pub workdir: PathBuf,
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

struct SessionState {
    slave: Option<Box<dyn SlavePty + Send>>,
    writer: Box<dyn Write + Send>,
    child: Option<Box<dyn Child + Send + Sync>>,
    config: Option<SessionConfig>,
    chunks: Receiver<Vec<u8>>,
    closed: bool,
}

/// A reusable pseudo-terminal: one real OS pty pair, hosting a succession
/// of child agent processes over its lifetime. All mutable state lives
/// behind a single mutex (a reentrant per-session lock).
pub struct Session {
    id: String,
    master: Box<dyn MasterPty + Send>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Allocate a fresh PTY pair. Called once per session.
    pub fn open(id: impl Into<String>) -> Result<Self, PtyError> {
        let pty_system = native_pty_system();
        let size = PtySize { rows: 24, cols: 80, pixel_width: 0, pixel_height: 0 };
        let pair = pty_system.openpty(size).map_err(|e| PtyError::Allocate(e.to_string()))?;

        let writer = pair.master.take_writer().map_err(|e| PtyError::Allocate(e.to_string()))?;
        let mut reader =
            pair.master.try_clone_reader().map_err(|e| PtyError::Allocate(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = [0u8; WATCHER_READ_CHUNK_BYTES];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            id: id.into(),
            master: pair.master,
            state: Mutex::new(SessionState {
                slave: Some(pair.slave),
                writer,
                child: None,
                config: None,
                chunks: rx,
                closed: false,
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configure the agent binary, working directory, environment overrides,
    /// and per-invocation timeout used by the next `spawn_exec`.
    pub fn configure(&self, config: SessionConfig) {
        self.state.lock().config = Some(config);
    }

    /// The currently configured bin/workdir/env/timeout, if any.
    pub fn config(&self) -> Option<SessionConfig> {
        self.state.lock().config.clone()
    }

    /// Spawn `<bin> exec <command>` inside this session's pty. At most one
    /// live child per session — calling this while a previous child is
    /// still running is a programmer error.
    pub fn spawn_exec(&self, command: &str) -> Result<(), PtyError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PtyError::Closed);
        }
        if let Some(child) = state.child.as_mut() {
            let still_alive = matches!(child.try_wait(), Ok(None));
            assert!(!still_alive, "spawn_exec called while a previous child is still alive");
        }

        let config = state.config.clone().unwrap_or_default();
        let mut cmd = CommandBuilder::new(&config.bin);
        cmd.arg("exec");
        cmd.arg(command);
        cmd.cwd(&config.workdir);
        for (k, v) in &config.env {
            cmd.env(k, v);
        }

        let Some(slave) = state.slave.as_ref() else {
            return Err(PtyError::Closed);
        };
        let child = slave.spawn_command(cmd).map_err(|e| PtyError::Spawn(e.to_string()))?;
        state.child = Some(child);
        Ok(())
    }

    /// Best-effort read of whatever output has arrived within `timeout`.
    /// Decodes UTF-8 with replacement; may return an empty string.
    pub fn read(&self, timeout: Duration) -> String {
        let state = self.state.lock();
        match state.chunks.recv_timeout(timeout) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    pub fn write(&self, bytes: &[u8]) -> Result<(), PtyError> {
        let mut state = self.state.lock();
        state.writer.write_all(bytes).map_err(|e| PtyError::Write(e.to_string()))?;
        state.writer.flush().map_err(|e| PtyError::Write(e.to_string()))
    }

    /// Poll the current child's exit status without blocking.
    pub fn try_wait(&self) -> Option<u32> {
        let mut state = self.state.lock();
        let child = state.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            _ => None,
        }
    }

    /// Block until the current child exits, returning its exit code.
    pub fn wait(&self) -> Option<u32> {
        let mut state = self.state.lock();
        let child = state.child.as_mut()?;
        child.wait().ok().map(|status| status.exit_code())
    }

    /// Send a termination signal to the current child, if any.
    pub fn terminate(&self) {
        let mut state = self.state.lock();
        if let Some(child) = state.child.as_mut() {
            let _ = child.kill();
        }
    }

    /// Read-only accessor for the master file descriptor, informational only
    /// (e.g. logging); interactive I/O goes through [`Session::clone_reader`]
    /// and [`Session::write`] instead, since duplicating it into a usable
    /// handle would need an `unsafe` fd-to-`File` conversion this workspace
    /// forbids.
    pub fn master_fd(&self) -> Option<i32> {
        self.master.as_raw_fd()
    }

    /// A second, independent reader over this session's pty output, for
    /// `attach`'s interactive-I/O use case. Safe-Rust stand-in for hand-duping
    /// the master fd: `portable-pty` already clones the underlying descriptor
    /// internally.
    pub fn clone_reader(&self) -> Result<Box<dyn Read + Send>, PtyError> {
        self.master.try_clone_reader().map_err(|e| PtyError::Allocate(e.to_string()))
    }

    /// Idempotent: terminates any live child and releases the pty pair.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if let Some(child) = state.child.as_mut() {
            let _ = child.kill();
        }
        state.slave = None;
        state.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
