//! Values carried by store variables and outbound messages.

use std::fmt;

/// A store value: every variable is either numeric or textual.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Double(f64),
    Str(String),
}

impl Value {
    /// Interpret a configuration literal: numbers become `Double`, anything
    /// else (including `true`/`false`) stays a string.
    pub fn parse_literal(s: &str) -> Value {
        let t = s.trim();
        match t.parse::<f64>() {
            Ok(d) if d.is_finite() => Value::Double(d),
            _ => Value::Str(t.to_string()),
        }
    }

    /// Numeric view.  Strings that parse as a number count as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Str(s)    => s.trim().parse::<f64>().ok(),
        }
    }

    /// String view; `None` for doubles.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s)    => Some(s),
            Value::Double(_) => None,
        }
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(d) => write!(f, "{d}"),
            Value::Str(s)    => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Str(if b { "true" } else { "false" }.to_string())
    }
}
