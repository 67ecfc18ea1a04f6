//! `helm-output` — arbiter output writers for the helm workspace.
//!
//! | Backend | Files created                                                  |
//! |---------|----------------------------------------------------------------|
//! | CSV     | `life_events.csv`, `cycle_summaries.csv`, `behavior_status.csv`|
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`ArbiterOutputObserver`], which implements
//! `helm_arbiter::ArbiterObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use helm_output::{ArbiterOutputObserver, CsvWriter};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ArbiterOutputObserver::new(writer);
//! for t in 0..600 {
//!     arbiter.run_cycle(t as f64, &mut obs);
//! }
//! arbiter.finish(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ArbiterOutputObserver;
pub use row::{BehaviorStatusRow, CycleSummaryRow, LifeEventRow};
pub use writer::OutputWriter;
