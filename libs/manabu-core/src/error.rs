//! Error types for manabu-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors raised while validating learner input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("unknown item type: {0}")]
    UnknownItemType(String),

    #[error("invalid quiz score {score} of {total}")]
    InvalidQuizScore { score: u32, total: u32 },
}
