//! Crate-level error types
//!
//! Syntax problems surface as [`ParseError`](crate::parser::ParseError) at
//! compile time; failures inside a running lambda surface as
//! [`EvalError`](crate::evaluator::EvalError). Both are carried unmodified by
//! [`LambdaError`].

use thiserror::Error;

/// Result type alias for lambda operations
pub type Result<T> = std::result::Result<T, LambdaError>;

/// Error type covering every failure a [`Lambda`](crate::Lambda) can surface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LambdaError {
    /// Definition text failed to parse
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),

    /// A compiled unit failed at execution time
    #[error(transparent)]
    Eval(#[from] crate::evaluator::EvalError),

    /// A construction-time definition value was not usable
    #[error("Invalid definition: {message}")]
    InvalidDefinition {
        /// What was wrong with the definition value
        message: String,
    },
}

impl LambdaError {
    /// Create an invalid definition error
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }
}
