//! `StateStore` — time-stamped snapshot of named values with delta history.
//!
//! # Model
//!
//! The store holds, per variable, the most recent value and the mission time
//! it was posted.  Alongside the snapshot it keeps every posting received
//! since the last [`StateStore::clear_deltas`] call, in arrival order.  The
//! arbiter drains the delta history once at the end of each cycle, so within
//! a cycle `query_deltas` returns exactly the postings that arrived since the
//! previous cycle (plus anything posted during this one, e.g. mode values).
//!
//! Transport threads outside the core must hand postings to the cycle thread
//! through their own queue; the store itself is plain single-threaded data.

use crate::Value;

#[cfg(feature = "fx-hash")]
type VarMap<V> = rustc_hash::FxHashMap<String, V>;

#[cfg(not(feature = "fx-hash"))]
type VarMap<V> = std::collections::HashMap<String, V>;

/// One posting of a variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Posting {
    pub value: Value,
    /// Mission time of the posting.
    pub time:  f64,
}

#[derive(Clone, Debug)]
struct VarEntry {
    value: Value,
    time:  f64,
}

/// Snapshot of all known variables plus per-variable delta history.
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    vars:   VarMap<VarEntry>,
    deltas: VarMap<Vec<Posting>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Post `value` to `name` at mission time `time`.
    ///
    /// Updates the snapshot and appends to the delta history.
    pub fn post(&mut self, name: &str, value: impl Into<Value>, time: f64) {
        let value = value.into();
        self.deltas
            .entry(name.to_string())
            .or_default()
            .push(Posting { value: value.clone(), time });
        self.vars.insert(name.to_string(), VarEntry { value, time });
    }

    /// Drop all delta history.  Snapshot values are retained.
    pub fn clear_deltas(&mut self) {
        self.deltas.clear();
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Current value of `name`, whatever its type.
    pub fn query_value(&self, name: &str) -> Option<&Value> {
        self.vars.get(name).map(|e| &e.value)
    }

    /// Current value of `name` if it holds a string.
    pub fn query_string(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(|e| e.value.as_str())
    }

    /// Current value of `name` if it holds a double.
    pub fn query_double(&self, name: &str) -> Option<f64> {
        match self.vars.get(name).map(|e| &e.value) {
            Some(Value::Double(d)) => Some(*d),
            _ => None,
        }
    }

    /// Seconds between the last posting of `name` and `now`.
    ///
    /// `None` if the variable has never been posted.
    pub fn query_age(&self, name: &str, now: f64) -> Option<f64> {
        self.vars.get(name).map(|e| (now - e.time).max(0.0))
    }

    /// All postings of `name` since the last drain, oldest first.
    pub fn query_deltas(&self, name: &str) -> &[Posting] {
        self.deltas.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` if `name` has been posted at least once.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of distinct known variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Names of all known variables, in no particular order.
    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }
}
