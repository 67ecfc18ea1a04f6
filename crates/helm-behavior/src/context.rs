//! Read-only cycle state passed to every behavior.

use helm_core::{Iteration, StateStore};
use helm_ivp::DecisionDomain;

/// Snapshot handed to [`Behavior::advance`][crate::Behavior::advance] and
/// on to the behavior kind.
///
/// Built once per cycle by the arbiter after mode evaluation.  All borrows
/// live for the duration of that cycle's advance phase.
pub struct BehaviorContext<'a> {
    /// Mission time of the cycle, in seconds.
    pub now: f64,

    pub iteration: Iteration,

    /// Shared vehicle state, including this cycle's mode values.
    pub store: &'a StateStore,

    /// The action space every objective is built over.
    pub domain: &'a DecisionDomain,
}

impl<'a> BehaviorContext<'a> {
    #[inline]
    pub fn new(
        now:       f64,
        iteration: Iteration,
        store:     &'a StateStore,
        domain:    &'a DecisionDomain,
    ) -> Self {
        Self { now, iteration, store, domain }
    }
}
