//! Frame throttling and debouncing on host-supplied timestamps.
//!
//! The host owns the clock: every call carries `now` in milliseconds, the
//! same time base as `performance.now()`. Nothing here blocks or sleeps.

/// Coalesces any number of requests into one unit of work per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameThrottle {
    pending: bool,
}

impl FrameThrottle {
    /// Ask for work on the next frame. Returns `true` only for the request
    /// that armed the throttle; later requests in the same frame coalesce.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Consume the pending request at frame time.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Fires once after a quiet period with no new triggers.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    quiet_ms: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms,
            deadline: None,
        }
    }

    /// Restart the quiet period. Never stacks: only the latest trigger counts.
    pub fn trigger(&mut self, now: f64) {
        self.deadline = Some(now + self.quiet_ms);
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn fire_if_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }
}
