//! Per-cycle behavior output: run state, reports, and status records.

use std::fmt;

use helm_core::{BehaviorId, Iteration};
use helm_ivp::PieceFunction;

// ── RunState ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle      => "idle",
            RunState::Running   => "running",
            RunState::Completed => "completed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the behavior is in its current state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateReason {
    /// Not yet advanced.
    #[default]
    Pending,
    /// A run condition is false.
    Conditions,
    /// A no-starve input went stale.
    Starved(String),
    /// Duration limit reached.
    Duration,
    /// Perpetual behavior restarting after completion.
    Reset,
    /// All checks passed.
    Ok,
}

impl fmt::Display for StateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateReason::Pending     => f.write_str("pending"),
            StateReason::Conditions  => f.write_str("conditions"),
            StateReason::Starved(v)  => write!(f, "starved:{v}"),
            StateReason::Duration    => f.write_str("duration"),
            StateReason::Reset       => f.write_str("reset"),
            StateReason::Ok          => f.write_str("ok"),
        }
    }
}

// ── BehaviorReport ────────────────────────────────────────────────────────────

/// The weighted functions one running behavior contributes to a cycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorReport {
    pub behavior:    String,
    pub iteration:   Iteration,
    pub priority_wt: f64,
    functions:       Vec<(String, PieceFunction)>,
}

impl BehaviorReport {
    pub fn new(behavior: &str, iteration: Iteration, priority_wt: f64) -> Self {
        Self { behavior: behavior.to_string(), iteration, priority_wt, functions: Vec::new() }
    }

    /// Add a function under `key`.  A key already in the report gets a
    /// numeric suffix (`key_2`, `key_3`, ...).
    pub fn add_function(&mut self, key: &str, function: PieceFunction) {
        let mut unique = key.to_string();
        let mut n = 2;
        while self.functions.iter().any(|(k, _)| *k == unique) {
            unique = format!("{key}_{n}");
            n += 1;
        }
        self.functions.push((unique, function));
    }

    pub fn functions(&self) -> &[(String, PieceFunction)] {
        &self.functions
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Total boxes across all functions.
    pub fn piece_count(&self) -> usize {
        self.functions.iter().map(|(_, f)| f.size()).sum()
    }
}

// ── BehaviorStatus ────────────────────────────────────────────────────────────

/// Observability record for one live behavior.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorStatus {
    pub id:            BehaviorId,
    pub name:          String,
    pub kind:          String,
    pub priority_wt:   f64,
    pub state:         RunState,
    pub reason:        StateReason,
    /// Producing output this cycle.
    pub active:        bool,
    pub good_updates:  u32,
    pub bad_updates:   u32,
    pub elapsed_secs:  f64,
}

impl fmt::Display for BehaviorStatus {
    /// `name=loiter,type=BHV_Loiter,pwt=100,state=running,reason=ok,upd=3/0`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name={},type={},pwt={},state={},reason={},upd={}/{}",
            self.name, self.kind, self.priority_wt, self.state, self.reason,
            self.good_updates, self.bad_updates,
        )
    }
}
