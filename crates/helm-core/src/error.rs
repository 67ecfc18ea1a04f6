//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where a condition or value parse can fail inside them.

use thiserror::Error;

/// The error type for `helm-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("condition parse error in {expr:?}: {reason}")]
    Condition { expr: String, reason: String },

    #[error("invalid value for {name}: {value:?}")]
    BadValue { name: String, value: String },
}

/// Shorthand result type for `helm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
