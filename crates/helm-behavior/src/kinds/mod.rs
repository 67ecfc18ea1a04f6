//! The `BehaviorKind` trait and the built-in behavior types.
//!
//! | Type                   | Objective | Reads from the store                 |
//! |------------------------|-----------|--------------------------------------|
//! | `BHV_ConstantHeading`  | `shadow`  | nothing                              |
//! | `BHV_ConstantSpeed`    | `shadow`  | nothing                              |
//! | `BHV_Shadow`           | `shadow`  | contact heading and speed            |
//! | `BHV_AvoidObstacle`    | `avoid`   | own position (`NAV_X`, `NAV_Y`)      |

use std::fmt;

use helm_ivp::ObjectiveFunction;

use crate::{BehaviorContext, BehaviorResult, Message};

pub mod avoid_obstacle;
pub mod constant_heading;
pub mod constant_speed;
pub mod shadow;

pub use avoid_obstacle::AvoidObstacle;
pub use constant_heading::ConstantHeading;
pub use constant_speed::ConstantSpeed;
pub use shadow::Shadow;

/// Type-specific half of a behavior.
///
/// The generic run-state machine, flags, updates, and reflection live in
/// [`Behavior`][crate::Behavior]; a kind only owns its own parameters and
/// turns them into objective functions.
///
/// # Required methods
///
/// [`type_name`][Self::type_name], [`set_param`][Self::set_param],
/// [`on_run`][Self::on_run], and [`clone_box`][Self::clone_box].
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, Default)]
/// struct HoldDepth { depth: Option<f64> }
///
/// impl BehaviorKind for HoldDepth {
///     fn type_name(&self) -> &'static str { "BHV_HoldDepth" }
///     fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
///         match key {
///             "depth" => { self.depth = Some(parse_f64(key, value)?); Ok(true) }
///             _ => Ok(false),
///         }
///     }
///     fn on_run(&mut self, ctx: &BehaviorContext<'_>, _posts: &mut Vec<Message>)
///         -> BehaviorResult<Vec<(String, ObjectiveFunction)>> { ... }
///     fn clone_box(&self) -> Box<dyn BehaviorKind> { Box::new(self.clone()) }
/// }
/// ```
pub trait BehaviorKind: fmt::Debug {
    /// Configuration name, e.g. `BHV_ConstantHeading`.
    fn type_name(&self) -> &'static str;

    /// Apply one parameter.  `Ok(false)` means the key is not one of this
    /// kind's parameters; an `Err` means the key is known but the value is
    /// invalid.
    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool>;

    /// Build this cycle's objectives, keyed for the report.  An empty list
    /// means the behavior is running but has nothing to say this cycle.
    /// Extra postings may be pushed onto `posts`.
    fn on_run(
        &mut self,
        ctx:   &BehaviorContext<'_>,
        posts: &mut Vec<Message>,
    ) -> BehaviorResult<Vec<(String, ObjectiveFunction)>>;

    /// Reflector settings used when the configuration gives none.
    fn default_build_info(&self) -> Vec<(&'static str, &'static str)> {
        vec![]
    }

    fn clone_box(&self) -> Box<dyn BehaviorKind>;
}

impl Clone for Box<dyn BehaviorKind> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Parse a numeric parameter value.
pub fn parse_f64(key: &str, value: &str) -> BehaviorResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(crate::BehaviorError::Config(format!("{key}: expected a number, got {value:?}"))),
    }
}
