use helm_ivp::ObjectiveFunction;

use super::{parse_f64, BehaviorKind};
use crate::{BehaviorContext, BehaviorError, BehaviorResult, Message};

/// Matches a contact's heading and speed, read from the store each cycle.
///
/// With no fresh contact report the behavior runs but produces nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Shadow {
    heading_var: String,
    speed_var:   String,
    heading_wt:  f64,
    speed_wt:    f64,
    /// Ignore contact reports older than this many seconds.
    max_age:     Option<f64>,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            heading_var: "CONTACT_HEADING".into(),
            speed_var:   "CONTACT_SPEED".into(),
            heading_wt:  1.0,
            speed_wt:    1.0,
            max_age:     None,
        }
    }
}

impl Shadow {
    fn fresh(&self, ctx: &BehaviorContext<'_>, var: &str) -> Option<f64> {
        let value = ctx.store.query_value(var)?.as_f64()?;
        match (self.max_age, ctx.store.query_age(var, ctx.now)) {
            (Some(max), Some(age)) if age > max => None,
            _ => Some(value),
        }
    }
}

impl BehaviorKind for Shadow {
    fn type_name(&self) -> &'static str {
        "BHV_Shadow"
    }

    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
        let var = || -> BehaviorResult<String> {
            let v = value.trim();
            if v.is_empty() || v.contains(char::is_whitespace) {
                return Err(BehaviorError::Config(format!("{key}: bad variable name {value:?}")));
            }
            Ok(v.to_string())
        };
        match key {
            "heading_var" => self.heading_var = var()?,
            "speed_var"   => self.speed_var = var()?,
            "heading_wt"  => self.heading_wt = parse_f64(key, value)?.max(0.0),
            "speed_wt"    => self.speed_wt = parse_f64(key, value)?.max(0.0),
            "max_age"     => self.max_age = Some(parse_f64(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn on_run(
        &mut self,
        ctx:    &BehaviorContext<'_>,
        _posts: &mut Vec<Message>,
    ) -> BehaviorResult<Vec<(String, ObjectiveFunction)>> {
        let (Some(heading), Some(speed)) =
            (self.fresh(ctx, &self.heading_var), self.fresh(ctx, &self.speed_var))
        else {
            return Ok(vec![]);
        };
        let mut of = ObjectiveFunction::new("shadow", ctx.domain.clone())?;
        of.set_param("heading", heading)?;
        of.set_param("speed", speed)?;
        of.set_param("heading_wt", self.heading_wt)?;
        of.set_param("speed_wt", self.speed_wt)?;
        Ok(vec![("shadow".into(), of)])
    }

    fn default_build_info(&self) -> Vec<(&'static str, &'static str)> {
        vec![("uniform_piece", "course:10,speed:1"), ("smart_amount", "40"), ("smart_thresh", "5")]
    }

    fn clone_box(&self) -> Box<dyn BehaviorKind> {
        Box::new(self.clone())
    }
}
