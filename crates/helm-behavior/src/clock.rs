//! `DurationClock` — how long a behavior has been allowed to run.

/// Accumulates elapsed time between cycles.
///
/// By default only intervals that *began* in the `running` state count, so
/// time spent idle does not eat into the duration.  With `idle_decay` every
/// interval counts from the first cycle onward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DurationClock {
    limit:      Option<f64>,
    idle_decay: bool,
    elapsed:    f64,
    last_stamp: Option<f64>,
    counting:   bool,
}

impl DurationClock {
    pub fn set_limit(&mut self, limit: Option<f64>) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Option<f64> {
        self.limit
    }

    pub fn set_idle_decay(&mut self, on: bool) {
        self.idle_decay = on;
    }

    /// Account for the interval since the previous cycle.
    pub fn update(&mut self, now: f64) {
        if let Some(last) = self.last_stamp {
            if self.counting || self.idle_decay {
                self.elapsed += (now - last).max(0.0);
            }
        }
        self.last_stamp = Some(now);
    }

    /// Whether the interval starting now should count.
    pub fn set_counting(&mut self, on: bool) {
        self.counting = on;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds left before expiry; `None` without a limit.
    pub fn remaining(&self) -> Option<f64> {
        self.limit.map(|d| (d - self.elapsed).max(0.0))
    }

    pub fn expired(&self) -> bool {
        self.limit.is_some_and(|d| self.elapsed >= d)
    }

    /// Zero the accumulated time.  The next `update` starts a new interval.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.last_stamp = None;
        self.counting = false;
    }
}
