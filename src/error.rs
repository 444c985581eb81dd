//! Error types for the scope tree

use thiserror::Error;

/// Main error type for the scope tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("Invalid junction: {0}")]
    InvalidJunction(String),

    #[error("Negation of operator is not supported: {0}")]
    UnsupportedNegation(String),

    #[error("Operator is not supported: {0}")]
    UnsupportedOperator(String),

    #[error("Condition must be bound to a model")]
    MissingModel,

    #[error("Field not found: {model}.{field}")]
    FieldNotFound { model: String, field: String },

    #[error("Reference not found: {model}/{link}")]
    ReferenceNotFound { model: String, link: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Cannot typecast {value} for field {field}")]
    Typecast { field: String, value: String },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Evaluation not supported: {0}")]
    UnsupportedEvaluation(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Result type alias for the scope tree
pub type Result<T> = std::result::Result<T, ScopeError>;
