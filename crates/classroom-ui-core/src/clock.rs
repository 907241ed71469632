#![forbid(unsafe_code)]

//! Host-driven time.
//!
//! The page never reads a wall clock. The host advances a
//! [`DeterministicClock`] explicitly and the [`TimerQueue`] hands back the
//! timers whose deadlines have passed, in deadline order. Ties fire in the
//! order they were scheduled.

use core::time::Duration;
use std::collections::BTreeMap;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Identifier returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTimer<T> {
    pub id: TimerId,
    pub deadline: Duration,
    pub payload: T,
}

/// Deadline-ordered one-shot timers.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Schedule `payload` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((now.saturating_add(delay), seq), payload);
        TimerId(seq)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, seq)| *seq == id.0).copied();
        key.is_some_and(|key| self.pending.remove(&key).is_some())
    }

    /// Pop the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<DueTimer<T>> {
        let (&(deadline, seq), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let payload = self.pending.remove(&(deadline, seq))?;
        Some(DueTimer {
            id: TimerId(seq),
            deadline,
            payload,
        })
    }

    /// Earliest pending deadline, for hosts that schedule a wake-up.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
