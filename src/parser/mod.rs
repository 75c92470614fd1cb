//! Lambda definition parser
//!
//! Converts definition text into signature and body ASTs through an
//! explicit tokenizer and a Pratt parser.

pub mod error;
pub mod parser;
pub mod signature;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use parser::{Parser, Precedence};
pub use signature::{BodyKind, RestParam, Signature, parse_signature};
pub use tokenizer::{Token, Tokenizer};

use crate::ast::{ExpressionNode, Statement};

/// Parse an expression body into an AST
pub fn parse_expression(input: &str) -> ParseResult<ExpressionNode> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a brace-delimited block body into a statement list
pub fn parse_block(input: &str) -> ParseResult<Vec<Statement>> {
    let mut parser = Parser::new(input)?;
    let statements = parser.parse_block()?;
    parser.expect_eof()?;
    Ok(statements)
}
