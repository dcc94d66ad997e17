//! Cycle triggers: mutation debounce and the post-load retry schedule.

use std::time::Duration;
use tokio::time::Instant;

/// Why a cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    PageLoad,
    Mutation,
    /// 1-based retry attempt.
    Retry(u32),
    Refresh,
}

/// Events fed to [`Orchestrator::run`](super::Orchestrator::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Loaded,
    Mutated,
    RefreshRequested,
}

/// Admits at most one event per window; events inside the window are dropped, not deferred.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

/// Fixed number of attempts at a fixed interval, started by a page load.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    max: u32,
    interval: Duration,
    fired: u32,
    next: Option<Instant>,
}

impl RetrySchedule {
    pub fn new(max: u32, interval: Duration) -> Self {
        Self {
            max,
            interval,
            fired: 0,
            next: None,
        }
    }

    /// (Re)start: first attempt one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.fired = 0;
        self.next = (self.max > 0).then(|| now + self.interval);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next
    }

    /// Consume the due attempt. Returns its 1-based number.
    pub fn fire(&mut self, now: Instant) -> Option<u32> {
        match self.next {
            Some(at) if at <= now => {}
            _ => return None,
        }
        self.fired += 1;
        self.next = (self.fired < self.max).then(|| now + self.interval);
        Some(self.fired)
    }
}
