use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IvpError {
    #[error("axis {0:?} is not in the decision domain")]
    UnknownAxis(String),

    #[error("invalid axis {name:?}: {reason}")]
    BadAxis { name: String, reason: String },

    #[error("required parameter {param:?} is unset for {objective} objective")]
    UnsetParam { objective: &'static str, param: &'static str },

    #[error("unknown parameter {param:?} for {objective} objective")]
    UnknownParam { objective: &'static str, param: String },

    #[error("unknown objective type {0:?}")]
    UnknownObjective(String),

    #[error("objective evaluated before initialize()")]
    NotInitialized,

    #[error("piece function invariant violated: {0}")]
    InvalidFunction(String),
}

pub type IvpResult<T> = Result<T, IvpError>;
