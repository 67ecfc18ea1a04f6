//! The `OutputWriter` trait implemented by all backend writers.

use crate::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow, OutputResult};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`ArbiterOutputObserver::take_error`][crate::ArbiterOutputObserver::take_error].
pub trait OutputWriter {
    fn write_life_event(&mut self, row: &LifeEventRow) -> OutputResult<()>;

    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> OutputResult<()>;

    /// Write every live behavior's status for one publish cycle.
    fn write_statuses(&mut self, rows: &[BehaviorStatusRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
