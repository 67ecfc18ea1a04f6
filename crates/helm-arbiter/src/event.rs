//! Life-event records: one per behavior instantiation or retirement.

use std::fmt;

use helm_core::Iteration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeEventKind {
    /// Created at startup or by a spawn posting.
    Spawn,
    /// Removed after completing.
    Retire,
}

impl LifeEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LifeEventKind::Spawn  => "spawn",
            LifeEventKind::Retire => "retire",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LifeEvent {
    pub time:          f64,
    pub iteration:     Iteration,
    pub kind:          LifeEventKind,
    pub behavior:      String,
    pub behavior_type: String,
    /// The posting that caused a runtime spawn; empty otherwise.
    pub spawn_string:  String,
}

impl fmt::Display for LifeEvent {
    /// `time=12.00,iter=5,event=spawn,bname=s1,btype=BHV_Shadow,spawn=name=s1`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time={:.2},iter={},event={},bname={},btype={}",
            self.time,
            self.iteration.0,
            self.kind.as_str(),
            self.behavior,
            self.behavior_type,
        )?;
        if !self.spawn_string.is_empty() {
            write!(f, ",spawn={}", self.spawn_string)?;
        }
        Ok(())
    }
}
