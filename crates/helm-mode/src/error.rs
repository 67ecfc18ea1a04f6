use helm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModeError {
    #[error("mode entry has an empty variable name")]
    EmptyVar,

    #[error("mode entry for {var} has an empty value")]
    EmptyValue { var: String },

    #[error("mode entry for {var}: {source}")]
    Condition {
        var:    String,
        #[source]
        source: CoreError,
    },
}

pub type ModeResult<T> = Result<T, ModeError>;
