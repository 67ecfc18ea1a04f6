//! `ModeEvaluator` — the single forward pass over declared mode entries.

use std::fmt;

use helm_core::{StateStore, Value};
use tracing::{debug, trace};

use crate::ModeEntry;

// ── ModeSummary ───────────────────────────────────────────────────────────────

/// Result of one evaluation pass: the final value of every mode variable
/// assigned this cycle, in first-assignment order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModeSummary {
    pub values:  Vec<(String, String)>,
    /// `true` if `values` differs from the previous pass.
    pub changed: bool,
}

impl ModeSummary {
    pub fn value(&self, var: &str) -> Option<&str> {
        self.values.iter().find(|(v, _)| v == var).map(|(_, val)| val.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for ModeSummary {
    /// `MODE=ACTIVE:SURVEYING, TRANSIT=INACTIVE`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, val)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}={val}")?;
        }
        Ok(())
    }
}

// ── ModeEvaluator ─────────────────────────────────────────────────────────────

/// Ordered list of [`ModeEntry`]s, re-evaluated against the store each cycle.
#[derive(Clone, Debug, Default)]
pub struct ModeEvaluator {
    entries: Vec<ModeEntry>,
    last:    Vec<(String, String)>,
}

impl ModeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.  Entries are evaluated in the order they are added.
    pub fn add_entry(&mut self, entry: ModeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ModeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct mode variable names, in first-declaration order.
    pub fn mode_vars(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.var()) {
                out.push(e.var());
            }
        }
        out
    }

    /// Value `var` received in the most recent pass, if any.
    pub fn current(&self, var: &str) -> Option<&str> {
        self.last.iter().find(|(v, _)| v == var).map(|(_, val)| val.as_str())
    }

    /// Run one pass, then post each variable's final value into `store` at
    /// time `now`.
    ///
    /// Entries read earlier assignments of the same pass from a local
    /// overlay, so intermediate values (`ACTIVE` on the way to
    /// `ACTIVE:SURVEYING`) never reach the store.  A final value is only
    /// posted when it differs from what the store already holds, so
    /// unchanged modes do not generate delta traffic.
    pub fn evaluate(&mut self, store: &mut StateStore, now: f64) -> ModeSummary {
        let mut pass: Vec<(String, String)> = Vec::new();

        for entry in &self.entries {
            let var = entry.var();
            let Some(value) = select(entry, store, &pass) else {
                trace!(var, "no rule matched and no default; left unchanged");
                continue;
            };
            match pass.iter_mut().find(|(v, _)| v == var) {
                Some(slot) => slot.1 = value,
                None       => pass.push((var.to_string(), value)),
            }
        }

        for (var, value) in &pass {
            let unchanged = matches!(store.query_value(var), Some(Value::Str(s)) if s == value);
            if !unchanged {
                store.post(var, value.as_str(), now);
            }
        }

        let changed = pass != self.last;
        let summary = ModeSummary { values: pass, changed };
        if changed {
            debug!(modes = %summary, "mode change");
        }
        self.last.clone_from(&summary.values);
        summary
    }
}

/// Value `name` holds for this pass: assigned earlier in the pass, else the
/// store's snapshot.
fn lookup(store: &StateStore, pass: &[(String, String)], name: &str) -> Option<Value> {
    match pass.iter().find(|(v, _)| v == name) {
        Some((_, val)) => Some(Value::Str(val.clone())),
        None           => store.query_value(name).cloned(),
    }
}

/// Pick the value for one entry.
///
/// Rules are first tried against the store as it stands.  If none hold and
/// the entry refines a value assigned earlier in this pass, its rules are
/// retried with the variable rolled back to each shallower ancestor of that
/// value (`A:B:C` → `A:B` → `A`), so a sibling mode can replace a child that
/// an earlier entry attached.
fn select(entry: &ModeEntry, store: &StateStore, pass: &[(String, String)]) -> Option<String> {
    let var = entry.var();
    let prior = pass.iter().find(|(v, _)| v == var).map(|(_, val)| val.as_str());
    let base = |name: &str| lookup(store, pass, name);

    for rule in entry.rules() {
        if rule.holds_with(base) {
            return Some(match prior {
                Some(parent) if rule.references(var) => format!("{parent}:{}", rule.value),
                _ => rule.value.clone(),
            });
        }
    }

    if let Some(prior) = prior
        && entry.is_nested()
    {
        let levels: Vec<&str> = prior.split(':').collect();
        for depth in (1..levels.len()).rev() {
            let parent = levels[..depth].join(":");
            let overlay = |name: &str| {
                if name == var {
                    Some(Value::Str(parent.clone()))
                } else {
                    lookup(store, pass, name)
                }
            };
            let hit = entry
                .rules()
                .iter()
                .filter(|r| r.references(var))
                .find(|r| r.holds_with(&overlay));
            if let Some(rule) = hit {
                return Some(format!("{parent}:{}", rule.value));
            }
        }
    }

    entry.default_value().map(str::to_string)
}
