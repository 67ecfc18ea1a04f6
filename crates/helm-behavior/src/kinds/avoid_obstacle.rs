use helm_ivp::ObjectiveFunction;

use super::{parse_f64, BehaviorKind};
use crate::{BehaviorContext, BehaviorError, BehaviorResult, Message};

/// Penalizes courses that bring the vehicle within `buffer` of a fixed
/// obstacle point.
///
/// Reads own position from `NAV_X`/`NAV_Y`.  When `range_var` is set the
/// current range to the obstacle is posted there each running cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AvoidObstacle {
    obstacle:  Option<(f64, f64)>,
    buffer:    f64,
    horizon:   f64,
    range_var: Option<String>,
}

impl Default for AvoidObstacle {
    fn default() -> Self {
        Self { obstacle: None, buffer: 20.0, horizon: 60.0, range_var: None }
    }
}

impl BehaviorKind for AvoidObstacle {
    fn type_name(&self) -> &'static str {
        "BHV_AvoidObstacle"
    }

    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
        match key {
            // "x,y"
            "obstacle" => {
                let (x, y) = value.split_once(',').ok_or_else(|| {
                    BehaviorError::Config(format!("obstacle: expected x,y, got {value:?}"))
                })?;
                self.obstacle = Some((parse_f64(key, x)?, parse_f64(key, y)?));
            }
            "buffer" => {
                let b = parse_f64(key, value)?;
                if b <= 0.0 {
                    return Err(BehaviorError::Config(format!("buffer must be > 0, got {b}")));
                }
                self.buffer = b;
            }
            "horizon"   => self.horizon = parse_f64(key, value)?.max(0.0),
            "range_var" => self.range_var = Some(value.trim().to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn on_run(
        &mut self,
        ctx:   &BehaviorContext<'_>,
        posts: &mut Vec<Message>,
    ) -> BehaviorResult<Vec<(String, ObjectiveFunction)>> {
        let (ox, oy) = self
            .obstacle
            .ok_or_else(|| BehaviorError::Config("BHV_AvoidObstacle: obstacle is unset".into()))?;
        let (Some(x), Some(y)) = (ctx.store.query_double("NAV_X"), ctx.store.query_double("NAV_Y"))
        else {
            return Ok(vec![]);
        };

        if let Some(var) = &self.range_var {
            let range = ((ox - x).powi(2) + (oy - y).powi(2)).sqrt();
            posts.push(Message::new(var, range));
        }

        let mut of = ObjectiveFunction::new("avoid", ctx.domain.clone())?;
        for (name, v) in [
            ("osx", x), ("osy", y), ("obx", ox), ("oby", oy),
            ("buffer", self.buffer), ("horizon", self.horizon),
        ] {
            of.set_param(name, v)?;
        }
        Ok(vec![("avoid".into(), of)])
    }

    fn default_build_info(&self) -> Vec<(&'static str, &'static str)> {
        vec![("uniform_piece", "course:15,speed:1"), ("smart_amount", "60"), ("smart_thresh", "10")]
    }

    fn clone_box(&self) -> Box<dyn BehaviorKind> {
        Box::new(self.clone())
    }
}
