//! `helm-arbiter` — cycle orchestrator for the helm arbitration core.
//!
//! # One cycle
//!
//! ```text
//! run_cycle(now):
//!   ① Modes     — evaluate mode entries into the store, in declared order.
//!   ② Triggers  — read new postings of every spawn/clone template's
//!                 updates variable; `name=` is mandatory.
//!   ③ Spawn     — instantiate, rejecting names already live.
//!   ④ Advance   — run every live behavior's state machine.
//!   ⑤ Retire    — drop completed, non-perpetual behaviors.
//!   ⑥ Reports   — collect weighted functions from running behaviors.
//!   ⑦ Status    — counts, life events, warnings, throttled status postings.
//! ```
//!
//! Errors never leave `run_cycle`; they become warnings that are logged,
//! published as messages, and handed to the [`ArbiterObserver`].
//!
//! | Module          | Contents                                        |
//! |-----------------|-------------------------------------------------|
//! | [`arbiter`]     | `Arbiter`, `CycleSummary`, `CycleOutput`        |
//! | [`builder`]     | `ArbiterBuilder`                                |
//! | [`config`]      | `ArbiterConfig`                                 |
//! | [`loader`]      | behavior file parser                            |
//! | [`observer`]    | `ArbiterObserver`, `NoopObserver`               |
//! | [`event`]       | `LifeEvent`, `LifeEventKind`                    |
//! | [`error`]       | `ArbiterError`, `ArbiterResult<T>`              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use helm_arbiter::{load_str, ArbiterBuilder, NoopObserver};
//!
//! let mut arbiter = ArbiterBuilder::new(domain).loaded(load_str(text)).build()?;
//! for step in 0..100 {
//!     arbiter.post("NAV_SPEED", 1.5, step as f64);
//!     let out = arbiter.run_cycle(step as f64, &mut NoopObserver);
//!     optimizer.solve(&out.reports);
//! }
//! ```

pub mod arbiter;
pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod observer;

#[cfg(test)]
mod tests;

pub use arbiter::{Arbiter, CycleOutput, CycleSummary};
pub use builder::ArbiterBuilder;
pub use config::ArbiterConfig;
pub use error::{ArbiterError, ArbiterResult};
pub use event::{LifeEvent, LifeEventKind};
pub use loader::{load_file, load_reader, load_str, LoadWarning, LoadedConfig};
pub use observer::{ArbiterObserver, NoopObserver};
