// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe event bus.
//!
//! A topic string maps
//! to a list of handlers, guarded by a mutex; emit synchronously invokes
//! every current handler for that topic and swallows handler panics so one
//! bad subscriber never blocks the rest; `once` self-unsubscribes after its
//! first delivery; `wait_for` blocks the calling thread on a condition
//! variable until the next emit on a topic, or times out.

mod error;

pub use error::BusError;

use numerus_core::Event;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Per-topic delivery counters and last-emit timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventStats {
    pub count: u64,
    pub last_emit_epoch_ms: Option<u64>,
}

struct Topic {
    handlers: Vec<(u64, Handler)>,
    stats: EventStats,
    last_payload: Option<Event>,
}

impl Default for Topic {
    fn default() -> Self {
        Self { handlers: Vec::new(), stats: EventStats::default(), last_payload: None }
    }
}

struct State {
    topics: HashMap<String, Topic>,
}

/// Process-wide in-process event bus. Constructed once by `main` and passed
/// down explicitly to every component that needs it (no global singleton —
/// see the design notes on testability).
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<State>>,
    condvar: Arc<Condvar>,
    next_sub_id: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State { topics: HashMap::new() })),
            condvar: Arc::new(Condvar::new()),
            next_sub_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register `handler` for `topic`, returning a handle that can later
    /// unsubscribe it. Handlers are keyed by a monotonic subscription id
    /// rather than removed by value, since `Box<dyn Fn>` has no useful
    /// equality.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.state
            .lock()
            .topics
            .entry(topic.clone())
            .or_default()
            .handlers
            .push((id, Arc::new(handler)));
        Subscription { bus: self.clone(), topic, id }
    }

    /// Register a handler that unsubscribes itself after its first delivery.
    pub fn once<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let bus = self.clone();
        let fired_topic = topic.clone();
        let wrapped = move |event: &Event| {
            handler(event);
            bus.unsubscribe(&fired_topic, id);
        };
        self.state
            .lock()
            .topics
            .entry(topic.clone())
            .or_default()
            .handlers
            .push((id, Arc::new(wrapped)));
        Subscription { bus: self.clone(), topic, id }
    }

    fn unsubscribe(&self, topic: &str, id: u64) {
        if let Some(t) = self.state.lock().topics.get_mut(topic) {
            t.handlers.retain(|(sub_id, _)| *sub_id != id);
        }
    }

    /// Publish `event` on `topic`. Every handler registered for `topic` at
    /// the moment of the call is invoked synchronously, in registration
    /// order; a handler that panics is caught and the rest still run.
    pub fn emit(&self, topic: impl AsRef<str>, event: Event) {
        let topic = topic.as_ref();
        let handlers = {
            let mut state = self.state.lock();
            let t = state.topics.entry(topic.to_string()).or_default();
            t.stats.count += 1;
            t.stats.last_emit_epoch_ms = Some(epoch_ms());
            t.last_payload = Some(event.clone());
            self.condvar.notify_all();
            t.handlers.clone()
        };
        for (_, handler) in handlers {
            let handler = handler.clone();
            let event_ref = &event;
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(event_ref)));
        }
    }

    /// Block the calling thread until the next `emit` on `topic`, returning
    /// its payload, or until `timeout` elapses.
    pub fn wait_for(&self, topic: impl AsRef<str>, timeout: Duration) -> Result<Event, BusError> {
        let topic = topic.as_ref();
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        let start_count = state.topics.get(topic).map(|t| t.stats.count).unwrap_or(0);
        loop {
            if let Some(t) = state.topics.get(topic) {
                if t.stats.count != start_count {
                    if let Some(payload) = &t.last_payload {
                        return Ok(payload.clone());
                    }
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BusError::Timeout { topic: topic.to_string() });
            }
            let remaining = deadline - now;
            let result = self.condvar.wait_for(&mut state, remaining);
            if result.timed_out() {
                continue;
            }
        }
    }

    /// Per-topic delivery counters and last-emit timestamp.
    pub fn stats(&self, topic: impl AsRef<str>) -> EventStats {
        self.state.lock().topics.get(topic.as_ref()).map(|t| t.stats).unwrap_or_default()
    }
}

/// Handle returned by `subscribe`/`once`; drop it or call `unsubscribe`
/// explicitly to cancel delivery.
pub struct Subscription {
    bus: EventBus,
    topic: String,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.bus.unsubscribe(&self.topic, self.id);
    }
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
