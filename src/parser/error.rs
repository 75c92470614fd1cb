//! Parser error types

use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parse error with location information
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Syntax error at a specific location
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError {
        /// Position where the error occurred
        position: usize,
        /// Error message describing the syntax error
        message: String,
    },

    /// Unexpected token
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: String,
        /// Position where the token was found
        position: usize,
    },

    /// Expected token
    #[error("Expected {expected} at position {position}")]
    ExpectedToken {
        /// The expected token description
        expected: String,
        /// Position where the token was expected
        position: usize,
    },

    /// Unexpected end of input
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// Unclosed string literal
    #[error("Unclosed string literal starting at position {position}")]
    UnclosedString {
        /// Position where the unclosed string started
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid {literal_type} literal at position {position}: {value}")]
    InvalidLiteral {
        /// Type of literal that failed to parse
        literal_type: String,
        /// The invalid value that was encountered
        value: String,
        /// Position where the invalid literal was found
        position: usize,
    },

    /// Malformed parameter list in an arrow signature
    #[error("Invalid signature: {message} in '{text}'")]
    InvalidSignature {
        /// What was wrong with the parameter list
        message: String,
        /// The offending parameter-list text
        text: String,
    },

    /// A rest parameter appeared anywhere but the last position
    #[error("Rest parameter must be last in '{text}'")]
    MisplacedRestParameter {
        /// The offending parameter-list text
        text: String,
    },
}

impl ParseError {
    /// Create a syntax error
    pub fn syntax_error(position: usize, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            position,
            message: message.into(),
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
            text: text.into(),
        }
    }
}
