//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `life_events.csv`
//! - `cycle_summaries.csv`
//! - `behavior_status.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow, OutputResult};

pub const LIFE_EVENTS_FILE: &str = "life_events.csv";
pub const CYCLE_SUMMARIES_FILE: &str = "cycle_summaries.csv";
pub const BEHAVIOR_STATUS_FILE: &str = "behavior_status.csv";

/// Writes arbiter output to three CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    statuses:  Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join(LIFE_EVENTS_FILE))?;
        events.write_record(["iteration", "time", "event", "behavior", "behavior_type", "spawn"])?;

        let mut summaries = Writer::from_path(dir.join(CYCLE_SUMMARIES_FILE))?;
        summaries.write_record([
            "iteration", "time", "idle", "running", "completed", "active",
            "spawned_total", "retired_total", "warnings", "modes",
        ])?;

        let mut statuses = Writer::from_path(dir.join(BEHAVIOR_STATUS_FILE))?;
        statuses.write_record([
            "iteration", "behavior_id", "behavior", "behavior_type", "priority_wt",
            "state", "reason", "good_updates", "bad_updates", "elapsed_secs",
        ])?;

        Ok(Self { events, summaries, statuses, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_life_event(&mut self, row: &LifeEventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.iteration.to_string(),
            format!("{:.3}", row.time),
            row.event.to_string(),
            row.behavior.clone(),
            row.behavior_type.clone(),
            row.spawn.clone(),
        ])?;
        Ok(())
    }

    fn write_cycle_summary(&mut self, row: &CycleSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.iteration.to_string(),
            format!("{:.3}", row.time),
            row.idle.to_string(),
            row.running.to_string(),
            row.completed.to_string(),
            row.active.to_string(),
            row.spawned_total.to_string(),
            row.retired_total.to_string(),
            row.warnings.to_string(),
            row.modes.clone(),
        ])?;
        Ok(())
    }

    fn write_statuses(&mut self, rows: &[BehaviorStatusRow]) -> OutputResult<()> {
        for row in rows {
            self.statuses.write_record(&[
                row.iteration.to_string(),
                row.behavior_id.to_string(),
                row.behavior.clone(),
                row.behavior_type.clone(),
                row.priority_wt.to_string(),
                row.state.to_string(),
                row.reason.clone(),
                row.good_updates.to_string(),
                row.bad_updates.to_string(),
                format!("{:.3}", row.elapsed_secs),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        self.statuses.flush()?;
        Ok(())
    }
}
