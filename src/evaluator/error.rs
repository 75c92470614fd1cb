//! Evaluation error types

use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Runtime errors raised inside a compiled unit
///
/// These propagate unmodified to the caller of `execute`; there is no
/// translation, suppression, or retry anywhere in the evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// An operator was applied to operands it does not support
    #[error("Type error: {message}")]
    TypeError {
        /// What combination was rejected
        message: String,
    },

    /// Member or index access on the undefined sentinel or null
    #[error("Cannot read property '{property}' of {value}")]
    AbsentMember {
        /// The property or index that was accessed
        property: String,
        /// The absent base value ("undefined" or "null")
        value: String,
    },

    /// An identifier resolved to no parameter or local binding
    #[error("'{name}' is not defined")]
    UndefinedIdentifier {
        /// The unresolved name
        name: String,
    },

    /// A call expression's callee was not a function value
    #[error("{target} is not a function")]
    NotAFunction {
        /// Kind of the value that was called
        target: String,
    },

    /// Division by zero, overflow, or other arithmetic failure
    #[error("Arithmetic error: {message}")]
    ArithmeticError {
        /// What went wrong
        message: String,
    },

    /// A decimal literal in the AST could not be parsed
    #[error("Invalid decimal literal: {value}")]
    InvalidDecimal {
        /// The unparseable text
        value: String,
    },
}

impl EvalError {
    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create an absent member access error
    pub fn absent_member(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AbsentMember {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Create an undefined identifier error
    pub fn undefined_identifier(name: impl Into<String>) -> Self {
        Self::UndefinedIdentifier { name: name.into() }
    }

    /// Create a not-a-function error
    pub fn not_a_function(target: impl Into<String>) -> Self {
        Self::NotAFunction {
            target: target.into(),
        }
    }

    /// Create an arithmetic error
    pub fn arithmetic_error(message: impl Into<String>) -> Self {
        Self::ArithmeticError {
            message: message.into(),
        }
    }

    /// Create an invalid decimal literal error
    pub fn invalid_decimal(value: impl Into<String>) -> Self {
        Self::InvalidDecimal {
            value: value.into(),
        }
    }
}
