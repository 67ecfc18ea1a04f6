//! `helm-mode` — hierarchical mode evaluation.
//!
//! A *mode variable* is an ordinary store variable whose value the helm
//! derives every cycle from a list of conditions:
//!
//! ```text
//! set MODE = ACTIVE    { DEPLOY = true } else INACTIVE
//! set MODE = SURVEYING { MODE = ACTIVE  RETURN != true }
//! set MODE = RETURNING { MODE = ACTIVE  RETURN = true }
//! ```
//!
//! Entries are evaluated once per cycle in declaration order.  A value
//! written by an earlier entry is visible to later ones; nothing is iterated
//! to a fixpoint.  When a later entry re-assigns a variable and its matching
//! condition reads that same variable, the result nests under the earlier
//! value, so the example above yields `ACTIVE:SURVEYING` or
//! `ACTIVE:RETURNING` while deployed and `INACTIVE` otherwise.
//!
//! | Module          | Contents                                   |
//! |-----------------|--------------------------------------------|
//! | [`entry`]       | `ModeEntry`, `ModeRule`                    |
//! | [`evaluator`]   | `ModeEvaluator`, `ModeSummary`             |
//! | [`error`]       | `ModeError`, `ModeResult<T>`               |

pub mod entry;
pub mod error;
pub mod evaluator;


pub use entry::{ModeEntry, ModeRule};
pub use error::{ModeError, ModeResult};
pub use evaluator::{ModeEvaluator, ModeSummary};
