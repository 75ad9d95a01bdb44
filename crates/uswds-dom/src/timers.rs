//! Timer APIs
//!
//! setTimeout/clearTimeout on a virtual clock. Time only moves when the
//! host calls `Document::advance_time`, which keeps delayed behavior
//! deterministic.

use crate::Document;
use std::collections::BTreeMap;

/// Timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Callback run when a timer fires
pub type TimerCallback = Box<dyn FnOnce(&mut Document)>;

/// Pending timeouts ordered by (due time, id)
#[derive(Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<(u64, TimerId), TimerCallback>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `callback` to run `delay_ms` from now
    pub fn set_timeout(&mut self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers
            .insert((self.now_ms.saturating_add(delay_ms), id), callback);
        id
    }

    /// Cancel a pending timer. Returns false if it already fired.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let key = self.timers.keys().find(|(_, t)| *t == id).copied();
        key.is_some_and(|key| self.timers.remove(&key).is_some())
    }

    /// Check whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.keys().any(|(_, t)| *t == id)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `deadline`, moving the
    /// clock to its due time.
    pub(crate) fn pop_due(&mut self, deadline: u64) -> Option<TimerCallback> {
        let (&(due, id), _) = self.timers.first_key_value()?;
        if due > deadline {
            return None;
        }
        self.now_ms = due;
        self.timers.remove(&(due, id))
    }

    pub(crate) fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now_ms", &self.now_ms)
            .field("pending", &self.timers.len())
            .finish()
    }
}
