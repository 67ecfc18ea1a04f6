//! Arbiter observer trait for progress reporting and data collection.

use helm_behavior::BehaviorStatus;
use helm_core::Iteration;

use crate::{CycleSummary, LifeEvent};

/// Callbacks invoked by [`Arbiter::run_cycle`][crate::Arbiter::run_cycle].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — mode printer
///
/// ```rust,ignore
/// struct ModePrinter;
///
/// impl ArbiterObserver for ModePrinter {
///     fn on_cycle_end(&mut self, summary: &CycleSummary) {
///         if summary.modes_changed {
///             println!("{}: {}", summary.iteration, summary.modes);
///         }
///     }
/// }
/// ```
pub trait ArbiterObserver {
    /// Called at the start of each cycle, before mode evaluation.
    fn on_cycle_start(&mut self, _iteration: Iteration, _now: f64) {}

    /// Called for every spawn and retirement, in the order they happen.
    fn on_life_event(&mut self, _event: &LifeEvent) {}

    /// Called for every configuration or runtime warning.
    fn on_warning(&mut self, _warning: &str) {}

    /// Called on status-publish cycles with every live behavior's status.
    fn on_status(&mut self, _iteration: Iteration, _statuses: &[BehaviorStatus]) {}

    /// Called at the end of each cycle.
    fn on_cycle_end(&mut self, _summary: &CycleSummary) {}

    /// Called once by [`Arbiter::finish`][crate::Arbiter::finish].
    fn on_finish(&mut self, _last: Iteration) {}
}

/// An [`ArbiterObserver`] that does nothing.
pub struct NoopObserver;

impl ArbiterObserver for NoopObserver {}
