use helm_ivp::ObjectiveFunction;

use super::{parse_f64, BehaviorKind};
use crate::{BehaviorContext, BehaviorError, BehaviorResult, Message};

/// Prefers one fixed course; indifferent to speed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantHeading {
    heading: Option<f64>,
}

impl BehaviorKind for ConstantHeading {
    fn type_name(&self) -> &'static str {
        "BHV_ConstantHeading"
    }

    fn set_param(&mut self, key: &str, value: &str) -> BehaviorResult<bool> {
        match key {
            "heading" => {
                self.heading = Some(parse_f64(key, value)?.rem_euclid(360.0));
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
        let heading = self
            .heading
            .ok_or_else(|| BehaviorError::Config("BHV_ConstantHeading: heading is unset".into()))?;
        let mut of = ObjectiveFunction::new("shadow", ctx.domain.clone())?;
        of.set_param("heading", heading)?;
        of.set_param("heading_wt", 1.0)?;
        of.set_param("speed_wt", 0.0)?;
        Ok(vec![("heading".into(), of)])
    }

    fn default_build_info(&self) -> Vec<(&'static str, &'static str)> {
        vec![("uniform_piece", "course:10"), ("auto_peak", "true")]
    }

    fn clone_box(&self) -> Box<dyn BehaviorKind> {
        Box::new(self.clone())
    }
}
