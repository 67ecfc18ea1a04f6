//! `helm-core` — foundational types for the helm arbitration core.
//!
//! This crate is a dependency of every other `helm-*` crate.  It has no
//! `helm-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde` and `rustc-hash`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `BehaviorId`, `TemplateId`                            |
//! | [`time`]        | `Iteration`, `CycleClock`                             |
//! | [`value`]       | `Value` (double or string)                            |
//! | [`store`]       | `StateStore`, `Posting` — snapshot + delta history    |
//! | [`condition`]   | `LogicCondition` parser and evaluator                 |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public value types.|
//! | `fx-hash` | Uses `FxHashMap` for the store's variable table.         |

pub mod condition;
pub mod error;
pub mod ids;
pub mod store;
pub mod time;
pub mod value;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use condition::LogicCondition;
pub use error::{CoreError, CoreResult};
pub use ids::{BehaviorId, TemplateId};
pub use store::{Posting, StateStore};
pub use time::{CycleClock, Iteration};
pub use value::Value;
