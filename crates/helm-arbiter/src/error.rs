use helm_behavior::BehaviorError;
use helm_mode::ModeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("arbiter configuration error: {0}")]
    Config(String),

    #[error("behavior name {name:?} is already live; {origin} rejected")]
    NameCollision { name: String, origin: String },

    #[error("line {line}: {reason}")]
    Loader { line: usize, reason: String },

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;
