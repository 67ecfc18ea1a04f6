//! `ArbiterOutputObserver<W>` — bridges `ArbiterObserver` to an `OutputWriter`.

use helm_arbiter::{ArbiterObserver, CycleSummary, LifeEvent};
use helm_behavior::BehaviorStatus;
use helm_core::Iteration;

use crate::row::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`ArbiterObserver`] that writes life events, cycle summaries, and
/// behavior status to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `ArbiterObserver`
/// methods have no return value.  After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct ArbiterOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ArbiterOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> ArbiterObserver for ArbiterOutputObserver<W> {
    fn on_life_event(&mut self, event: &LifeEvent) {
        let result = self.writer.write_life_event(&LifeEventRow::from(event));
        self.store_err(result);
    }

    fn on_status(&mut self, iteration: Iteration, statuses: &[BehaviorStatus]) {
        if statuses.is_empty() {
            return;
        }
        let rows: Vec<BehaviorStatusRow> =
            statuses.iter().map(|s| BehaviorStatusRow::new(iteration, s)).collect();
        let result = self.writer.write_statuses(&rows);
        self.store_err(result);
    }

    fn on_cycle_end(&mut self, summary: &CycleSummary) {
        let result = self.writer.write_cycle_summary(&CycleSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_finish(&mut self, _last: Iteration) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
