//! `helm-ivp` — decision domains, piecewise box functions, and reflection.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`domain`]      | `Axis`, `DecisionDomain`                                  |
//! | [`ibox`]        | `Interval`, `IvpBox` — one axis-aligned weighted box      |
//! | [`function`]    | `PieceFunction` — disjoint union of boxes + priority      |
//! | [`objective`]   | `ObjectiveFunction` and its analytic variants             |
//! | [`reflector`]   | `Reflector` — objective → piecewise function              |
//! | [`error`]       | `IvpError`, `IvpResult<T>`                                |
//!
//! # Index space
//!
//! Boxes are expressed in grid *indices*, not native values: axis `d` with
//! `points = n` has indices `0..=n-1`, and index `i` maps to
//! `low + i * (high - low) / (n - 1)`.  Objectives are evaluated in native
//! values; the reflector does the conversion.

pub mod domain;
pub mod error;
pub mod function;
pub mod ibox;
pub mod objective;
pub mod reflector;


pub use domain::{Axis, DecisionDomain};
pub use error::{IvpError, IvpResult};
pub use function::PieceFunction;
pub use ibox::{Interval, IvpBox};
pub use objective::{
    AvoidObjective, LinearObjective, Objective, ObjectiveFunction, QuadraticObjective,
    RingObjective, ShadowObjective,
};
pub use reflector::Reflector;
