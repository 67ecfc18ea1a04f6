//! Plain data row types written by output backends.

use helm_arbiter::{CycleSummary, LifeEvent};
use helm_behavior::BehaviorStatus;
use helm_core::Iteration;

/// One behavior spawn or retirement.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeEventRow {
    pub iteration:     u64,
    pub time:          f64,
    /// `spawn` or `retire`.
    pub event:         &'static str,
    pub behavior:      String,
    pub behavior_type: String,
    /// Empty for startup behaviors and retirements.
    pub spawn:         String,
}

impl From<&LifeEvent> for LifeEventRow {
    fn from(e: &LifeEvent) -> Self {
        Self {
            iteration:     e.iteration.0,
            time:          e.time,
            event:         e.kind.as_str(),
            behavior:      e.behavior.clone(),
            behavior_type: e.behavior_type.clone(),
            spawn:         e.spawn_string.clone(),
        }
    }
}

/// Counts for one arbitration cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummaryRow {
    pub iteration:     u64,
    pub time:          f64,
    pub idle:          u32,
    pub running:       u32,
    pub completed:     u32,
    pub active:        u32,
    pub spawned_total: u64,
    pub retired_total: u64,
    pub warnings:      u32,
    /// `VAR=VALUE` pairs joined with `, `; empty without mode variables.
    pub modes:         String,
}

impl From<&CycleSummary> for CycleSummaryRow {
    fn from(s: &CycleSummary) -> Self {
        Self {
            iteration:     s.iteration.0,
            time:          s.time,
            idle:          s.idle as u32,
            running:       s.running as u32,
            completed:     s.completed as u32,
            active:        s.active as u32,
            spawned_total: s.spawned_total,
            retired_total: s.retired_total,
            warnings:      s.warnings as u32,
            modes:         s.modes.clone(),
        }
    }
}

/// One live behavior on a status-publish cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorStatusRow {
    pub iteration:     u64,
    pub behavior_id:   u32,
    pub behavior:      String,
    pub behavior_type: String,
    pub priority_wt:   f64,
    pub state:         &'static str,
    pub reason:        String,
    pub good_updates:  u32,
    pub bad_updates:   u32,
    pub elapsed_secs:  f64,
}

impl BehaviorStatusRow {
    pub fn new(iteration: Iteration, s: &BehaviorStatus) -> Self {
        Self {
            iteration:     iteration.0,
            behavior_id:   s.id.0,
            behavior:      s.name.clone(),
            behavior_type: s.kind.clone(),
            priority_wt:   s.priority_wt,
            state:         s.state.as_str(),
            reason:        s.reason.to_string(),
            good_updates:  s.good_updates,
            bad_updates:   s.bad_updates,
            elapsed_secs:  s.elapsed_secs,
        }
    }
}
