//! `BehaviorTemplate` — a parsed `behavior = Type { ... }` block.

use std::fmt;
use std::str::FromStr;

use crate::{BehaviorError, BehaviorResult};

/// Whether, and how, new instances may be created at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Templating {
    /// One static instance; no runtime instantiation.
    #[default]
    Disallowed,
    /// A live instance exists; new instances copy its current parameters.
    Clone,
    /// No instance at startup; new instances start from the static block.
    Spawn,
}

impl FromStr for Templating {
    type Err = BehaviorError;
    fn from_str(s: &str) -> BehaviorResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disallowed" | "false" | "none" => Ok(Templating::Disallowed),
            "clone"                         => Ok(Templating::Clone),
            "spawn"                         => Ok(Templating::Spawn),
            other => Err(BehaviorError::Config(format!("unknown templating mode {other:?}"))),
        }
    }
}

impl fmt::Display for Templating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Templating::Disallowed => "disallowed",
            Templating::Clone      => "clone",
            Templating::Spawn      => "spawn",
        })
    }
}

/// Immutable configuration for one behavior type.
///
/// `params` keeps every `key = value` line of the block in order, with
/// `templating` already extracted.  Keys are lower-cased.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorTemplate {
    pub kind:       String,
    pub params:     Vec<(String, String)>,
    pub templating: Templating,
    /// Line of the `behavior =` header in the source file, if any.
    pub line:       usize,
}

impl BehaviorTemplate {
    pub fn new(kind: &str) -> Self {
        Self { kind: kind.trim().to_string(), params: Vec::new(), templating: Templating::Disallowed, line: 0 }
    }

    /// Append a parameter line.  `templating` is captured here rather than
    /// stored as a parameter.
    pub fn push_param(&mut self, key: &str, value: &str) -> BehaviorResult<()> {
        let key = key.trim().to_ascii_lowercase();
        if key == "templating" {
            self.templating = value.parse()?;
        } else {
            self.params.push((key, value.trim().to_string()));
        }
        Ok(())
    }

    pub fn with_param(mut self, key: &str, value: &str) -> BehaviorResult<Self> {
        self.push_param(key, value)?;
        Ok(self)
    }

    /// Last value given for `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.param("name")
    }

    /// Variable whose postings create instances (the `updates` variable).
    pub fn trigger(&self) -> Option<&str> {
        match self.templating {
            Templating::Disallowed => None,
            _ => self.param("updates"),
        }
    }

    /// Structural checks that do not need the behavior type.
    pub fn validate(&self) -> BehaviorResult<()> {
        if self.kind.is_empty() {
            return Err(BehaviorError::Config("behavior block without a type".into()));
        }
        if self.name().is_none_or(str::is_empty) {
            return Err(BehaviorError::Config(format!("{} block has no name", self.kind)));
        }
        if self.templating != Templating::Disallowed && self.trigger().is_none() {
            return Err(BehaviorError::Config(format!(
                "{} template {:?} needs an updates variable",
                self.kind,
                self.name().unwrap_or_default(),
            )));
        }
        Ok(())
    }
}
