/// Monotonic host time in seconds.
///
/// The runtime never reads a wall clock itself; hosts feed `Time` values in so
/// debouncing stays deterministic and replayable in tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms as f64 / 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Returns `self` shifted forward by `ms` milliseconds.
    pub fn after_millis(self, ms: u64) -> Self {
        Time(self.0 + ms as f64 / 1000.0)
    }

    pub fn has_reached(self, deadline: Time) -> bool {
        self.0 >= deadline.0
    }
}
