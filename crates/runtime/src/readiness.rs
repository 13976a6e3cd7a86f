/// Parks actions until a readiness signal arrives, then releases them once.
///
/// The gate itself holds no subscription. `defer` reports when the first
/// action is parked so the owner can subscribe to the readiness event, and
/// `release` hands everything back so the owner can run it and unsubscribe.
/// Equal actions are coalesced.
#[derive(Debug, Clone)]
pub struct ReadinessGate<T> {
    pending: Vec<T>,
}

impl<T> Default for ReadinessGate<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: PartialEq> ReadinessGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `action`.
    ///
    /// Returns `true` when the gate went from empty to waiting, i.e. the owner
    /// should subscribe to the readiness event now.
    pub fn defer(&mut self, action: T) -> bool {
        let was_empty = self.pending.is_empty();
        if !self.pending.contains(&action) {
            self.pending.push(action);
        }
        was_empty
    }

    pub fn is_waiting(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains parked actions in the order they were first deferred.
    pub fn release(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }
}
