use helm_core::CoreError;
use helm_ivp::IvpError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(String),

    #[error("behavior {behavior:?}: bad parameter {param:?}: {reason}")]
    Parameter {
        behavior: String,
        param:    String,
        reason:   String,
    },

    #[error("unknown behavior type {0:?}")]
    UnknownType(String),

    #[error("domain error: {0}")]
    Domain(#[from] IvpError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
