use foundation::time::Time;

#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    deadline: Time,
    action: T,
}

/// Trailing-edge debounce driven by host-supplied time.
///
/// Each `schedule` clears the running timer and starts a new one, replacing the
/// pending action. The action is handed back by `poll` once the quiet period
/// has elapsed, exactly once.
///
/// One instance per concern: the viewer uses it both for viewport fetches and
/// for recolor scheduling.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay_ms: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debounce<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Arms the timer at `now + delay`.
    ///
    /// Returns the action that was pending before, if any.
    pub fn schedule(&mut self, now: Time, action: T) -> Option<T> {
        let prev = self.pending.replace(Pending {
            deadline: now.after_millis(self.delay_ms),
            action,
        });
        prev.map(|p| p.action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Time> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.action)
    }

    /// Returns the pending action if its deadline has been reached.
    pub fn poll(&mut self, now: Time) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.has_reached(p.deadline));
        if !due {
            return None;
        }
        self.pending.take().map(|p| p.action)
    }
}
