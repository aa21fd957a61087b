//! Deadline timers polled by the engine tick.
//!
//! Re-arming overwrites the pending deadline, so each owner holds at most one
//! pending callback per timer.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OneShot {
    due_ms: Option<u64>,
}

impl OneShot {
    pub const fn new() -> Self {
        Self { due_ms: None }
    }

    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.due_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Consumes the deadline when it has been reached.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if due <= now_ms => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Repeating {
    due_ms: Option<u64>,
    interval_ms: Option<u64>,
}

impl Repeating {
    pub const fn new() -> Self {
        Self {
            due_ms: None,
            interval_ms: None,
        }
    }

    pub fn arm(&mut self, now_ms: u64, interval_ms: u64) {
        let interval_ms = interval_ms.max(1);
        self.interval_ms = Some(interval_ms);
        self.due_ms = Some(now_ms.saturating_add(interval_ms));
    }

    /// Clears the pending tick; the interval is kept so the timer can be re-armed.
    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    pub fn interval_ms(&self) -> Option<u64> {
        self.interval_ms
    }

    /// Consumes one tick when due and schedules the following one.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match (self.due_ms, self.interval_ms) {
            (Some(due), Some(interval)) if due <= now_ms => {
                self.due_ms = Some(due.saturating_add(interval));
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn earliest(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
