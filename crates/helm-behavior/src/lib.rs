//! `helm-behavior` — behavior run-state machine, templates, and kinds.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`behavior`]   | `Behavior` — shared config, run-state machine, reflection    |
//! | [`kinds`]      | `BehaviorKind` trait + built-in behavior types               |
//! | [`registry`]   | `BehaviorRegistry` — type name → factory                     |
//! | [`template`]   | `BehaviorTemplate`, `Templating`                             |
//! | [`report`]     | `RunState`, `StateReason`, `BehaviorReport`, `BehaviorStatus`|
//! | [`flags`]      | `Message`, `FlagKind`, `FlagSet`                             |
//! | [`clock`]      | `DurationClock`                                              |
//! | [`fields`]     | `key=value # ...` field strings                              |
//! | [`context`]    | `BehaviorContext<'a>` — read-only cycle snapshot             |
//! | [`error`]      | `BehaviorError`, `BehaviorResult<T>`                         |
//!
//! # Design notes
//!
//! A behavior is split in two.  [`Behavior`] owns everything every type has
//! in common (priority, duration, conditions, flags, updates, reflector
//! settings) and runs the state machine.  The boxed [`BehaviorKind`] owns
//! only the type-specific parameters and builds objective functions when
//! the behavior is running.  Both halves are configured through one
//! `set_param(key, value)` path, used for static configuration, runtime
//! updates, and spawn strings alike.

pub mod behavior;
pub mod clock;
pub mod context;
pub mod error;
pub mod fields;
pub mod flags;
pub mod kinds;
pub mod registry;
pub mod report;
pub mod template;


pub use behavior::Behavior;
pub use clock::DurationClock;
pub use context::BehaviorContext;
pub use error::{BehaviorError, BehaviorResult};
pub use flags::{FlagKind, FlagSet, Message};
pub use kinds::BehaviorKind;
pub use registry::{BehaviorRegistry, KindFactory};
pub use report::{BehaviorReport, BehaviorStatus, RunState, StateReason};
pub use template::{BehaviorTemplate, Templating};
