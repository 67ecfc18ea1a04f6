//! `key=value # key=value` strings used by update, spawn, and build_info
//! postings.

use crate::{BehaviorError, BehaviorResult};

/// Separator between fields.
pub const FIELD_SEP: char = '#';

/// Split `s` into `(key, value)` pairs.  Keys are lower-cased; values keep
/// their case.  Empty fields are skipped.
pub fn parse_fields(s: &str) -> BehaviorResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for field in s.split(FIELD_SEP).map(str::trim).filter(|f| !f.is_empty()) {
        let Some((key, value)) = field.split_once('=') else {
            return Err(BehaviorError::Config(format!("field {field:?} is not key=value")));
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(BehaviorError::Config(format!("field {field:?} has an empty key")));
        }
        out.push((key, value.trim().to_string()));
    }
    Ok(out)
}

/// Value of the `name` field, if present.
pub fn name_field(fields: &[(String, String)]) -> Option<&str> {
    fields.iter().rev().find(|(k, _)| k == "name").map(|(_, v)| v.as_str())
}

/// `true` if the posting asks to be re-applied even when unchanged.
pub fn is_toggle(s: &str) -> bool {
    s.to_ascii_lowercase().contains("toggle")
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1"  => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
