//! Outbound messages and lifecycle flags.
//!
//! A flag is a `VAR=VALUE` pair queued as a [`Message`] when the behavior
//! crosses a lifecycle edge.  Flags are never written to the store directly;
//! the host publishes them after the cycle.

use std::fmt;

use helm_core::Value;

use crate::{BehaviorError, BehaviorResult};

/// One queued outbound posting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub var:   String,
    pub value: Value,
}

impl Message {
    pub fn new(var: &str, value: impl Into<Value>) -> Self {
        Self { var: var.to_string(), value: value.into() }
    }

    /// Parse `VAR=VALUE`.  Numeric values become doubles.
    pub fn parse(s: &str) -> BehaviorResult<Self> {
        let (var, value) = s
            .split_once('=')
            .ok_or_else(|| BehaviorError::Config(format!("flag {s:?} is not VAR=VALUE")))?;
        let var = var.trim();
        if var.is_empty() || var.contains(char::is_whitespace) {
            return Err(BehaviorError::Config(format!("flag {s:?} has a bad variable name")));
        }
        Ok(Self { var: var.to_string(), value: Value::parse_literal(value) })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

/// Which lifecycle edge a flag fires on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// Entering `running`.
    Run,
    /// Entering `idle`.
    Idle,
    /// Starting to produce output.
    Active,
    /// Stopping output.
    Inactive,
    /// Reaching `completed`.
    End,
}

impl FlagKind {
    /// Map a configuration key (`runflag`, `endflag`, ...) to its kind.
    pub fn from_param(key: &str) -> Option<Self> {
        match key {
            "runflag"      => Some(FlagKind::Run),
            "idleflag"     => Some(FlagKind::Idle),
            "activeflag"   => Some(FlagKind::Active),
            "inactiveflag" => Some(FlagKind::Inactive),
            "endflag"      => Some(FlagKind::End),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlagSet {
    run:      Vec<Message>,
    idle:     Vec<Message>,
    active:   Vec<Message>,
    inactive: Vec<Message>,
    end:      Vec<Message>,
}

impl FlagSet {
    pub fn add(&mut self, kind: FlagKind, flag: Message) {
        self.slot_mut(kind).push(flag);
    }

    pub fn get(&self, kind: FlagKind) -> &[Message] {
        match kind {
            FlagKind::Run      => &self.run,
            FlagKind::Idle     => &self.idle,
            FlagKind::Active   => &self.active,
            FlagKind::Inactive => &self.inactive,
            FlagKind::End      => &self.end,
        }
    }

    /// Queue every flag of `kind` onto `out`.
    pub fn fire(&self, kind: FlagKind, out: &mut Vec<Message>) {
        out.extend(self.get(kind).iter().cloned());
    }

    fn slot_mut(&mut self, kind: FlagKind) -> &mut Vec<Message> {
        match kind {
            FlagKind::Run      => &mut self.run,
            FlagKind::Idle     => &mut self.idle,
            FlagKind::Active   => &mut self.active,
            FlagKind::Inactive => &mut self.inactive,
            FlagKind::End      => &mut self.end,
        }
    }
}
