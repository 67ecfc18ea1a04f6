//! One `set VAR = VALUE { ... } else DEFAULT` declaration.

use helm_core::LogicCondition;

use crate::{ModeError, ModeResult};

/// A condition that, when true, assigns `value` to the entry's variable.
///
/// Several condition lines inside one `{ ... }` block are a conjunction and
/// are stored as a list.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeRule {
    pub conditions: Vec<LogicCondition>,
    pub value:      String,
}

impl ModeRule {
    pub fn holds_with<F>(&self, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<helm_core::Value>,
    {
        self.conditions.iter().all(|c| c.evaluate_with(&lookup))
    }

    /// `true` if any condition reads `var`.
    pub fn references(&self, var: &str) -> bool {
        self.conditions.iter().any(|c| c.references(var))
    }
}

/// A mode variable with its ordered rules and optional fallback value.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeEntry {
    var:     String,
    rules:   Vec<ModeRule>,
    default: Option<String>,
}

impl ModeEntry {
    pub fn new(var: &str) -> ModeResult<Self> {
        let var = var.trim();
        if var.is_empty() {
            return Err(ModeError::EmptyVar);
        }
        Ok(Self { var: var.to_string(), rules: Vec::new(), default: None })
    }

    /// Append a rule assigning `value` when every line in `conditions` holds.
    ///
    /// An empty condition list is a rule that always matches.
    pub fn with_rule<S: AsRef<str>>(mut self, conditions: &[S], value: &str) -> ModeResult<Self> {
        let value = self.checked_value(value)?;
        let conditions = conditions
            .iter()
            .map(|c| {
                LogicCondition::parse(c.as_ref())
                    .map_err(|source| ModeError::Condition { var: self.var.clone(), source })
            })
            .collect::<ModeResult<Vec<_>>>()?;
        self.rules.push(ModeRule { conditions, value });
        Ok(self)
    }

    pub fn with_default(mut self, value: &str) -> ModeResult<Self> {
        self.default = Some(self.checked_value(value)?);
        Ok(self)
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn rules(&self) -> &[ModeRule] {
        &self.rules
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// `true` if any rule reads the entry's own variable, i.e. the entry
    /// refines a value assigned earlier in the pass.
    pub fn is_nested(&self) -> bool {
        self.rules.iter().any(|r| r.references(&self.var))
    }

    fn checked_value(&self, value: &str) -> ModeResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ModeError::EmptyValue { var: self.var.clone() });
        }
        Ok(value.to_string())
    }
}
