//! Cycle time model.
//!
//! The arbiter is driven by an external scheduler at a fixed rate.  Each
//! call is one *iteration*; the scheduler supplies the mission time in
//! seconds.  All timeouts (durations, starvation windows, status throttles)
//! are comparisons against that supplied time, never scheduled callbacks.

use std::fmt;

// ── Iteration ─────────────────────────────────────────────────────────────────

/// Monotonic arbitration cycle counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iteration(pub u64);

impl Iteration {
    pub const ZERO: Iteration = Iteration(0);

    /// Iterations elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: Iteration) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Iteration {
    type Output = Iteration;
    #[inline]
    fn add(self, rhs: u64) -> Iteration {
        Iteration(self.0 + rhs)
    }
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── CycleClock ────────────────────────────────────────────────────────────────

/// Tracks the iteration count and the mission time of the current cycle.
///
/// The clock never reads the wall clock itself; [`CycleClock::advance`] is
/// handed the time by whoever drives the arbiter.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleClock {
    /// Mission time of the first cycle, set on the first `advance`.
    pub start_secs: Option<f64>,
    /// Mission time of the current cycle.
    pub now_secs: f64,
    /// Current iteration; the first cycle is iteration 1.
    pub iteration: Iteration,
}

impl CycleClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next cycle at mission time `now`.
    ///
    /// Time is not allowed to run backwards: a `now` earlier than the
    /// previous cycle is clamped to the previous cycle's time.
    pub fn advance(&mut self, now: f64) -> Iteration {
        if self.start_secs.is_none() {
            self.start_secs = Some(now);
            self.now_secs = now;
        } else {
            self.now_secs = now.max(self.now_secs);
        }
        self.iteration = self.iteration + 1;
        self.iteration
    }

    /// Seconds since the first cycle.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.start_secs.map_or(0.0, |s| self.now_secs - s)
    }
}

impl fmt::Display for CycleClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={:.2}s)", self.iteration, self.elapsed_secs())
    }
}
