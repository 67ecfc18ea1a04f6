use helm_ivp::ObjectiveFunction;

use super::{parse_f64, BehaviorKind};
use crate::{BehaviorContext, BehaviorError, BehaviorResult, Message};

/// Prefers one fixed speed; indifferent to course.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantSpeed {
    speed: Option<f64>,
}

impl BehaviorKind for ConstantSpeed {
    fn type_name(&self) -> &'static str {
        "BHV_ConstantSpeed"
    }

    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
        match key {
            "speed" => {
                let v = parse_f64(key, value)?;
                if v < 0.0 {
                    return Err(BehaviorError::Config(format!("speed must be >= 0, got {v}")));
                }
                self.speed = Some(v);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn on_run(
        &mut self,
        ctx:    &BehaviorContext<'_>,
        _posts: &mut Vec<Message>,
    ) -> BehaviorResult<Vec<(String, ObjectiveFunction)>> {
        let speed = self
            .speed
            .ok_or_else(|| BehaviorError::Config("BHV_ConstantSpeed: speed is unset".into()))?;
        let mut of = ObjectiveFunction::new("shadow", ctx.domain.clone())?;
        of.set_param("speed", speed)?;
        of.set_param("heading_wt", 0.0)?;
        of.set_param("speed_wt", 1.0)?;
        Ok(vec![("speed".into(), of)])
    }

    fn default_build_info(&self) -> Vec<(&'static str, &'static str)> {
        vec![("uniform_piece", "speed:1")]
    }

    fn clone_box(&self) -> Box<dyn BehaviorKind> {
        Box::new(self.clone())
    }
}
