//! Pratt parser for lambda bodies
//!
//! Parses the expression grammar with a precedence-climbing loop and block
//! bodies with a small statement parser. Operator precedence is defined in
//! a single table; postfix member access, indexing, and calls bind tighter
//! than any binary operator.

use rust_decimal::Decimal;

use super::error::{ParseError, ParseResult};
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, Statement, UnaryOperator};

/// Operator precedence levels (higher = tighter binding)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Logical OR (||), lowest
    Or = 1,
    /// Logical AND (&&)
    And = 2,
    /// Equality operators (==, !=, ===, !==)
    Equality = 3,
    /// Ordering operators (<, <=, >, >=)
    Comparison = 4,
    /// Additive operators (+, -)
    Additive = 5,
    /// Multiplicative operators (*, /, %)
    Multiplicative = 6,
}

impl Precedence {
    /// Convert precedence to raw u8 for fast comparison
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[inline]
fn get_precedence(token: &Token<'_>) -> Option<Precedence> {
    match token {
        Token::OrOr => Some(Precedence::Or),
        Token::AndAnd => Some(Precedence::And),
        Token::EqualEqual | Token::BangEqual | Token::EqualEqualEqual | Token::BangEqualEqual => {
            Some(Precedence::Equality)
        }
        Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual => {
            Some(Precedence::Comparison)
        }
        Token::Plus | Token::Minus => Some(Precedence::Additive),
        Token::Star | Token::Slash | Token::Percent => Some(Precedence::Multiplicative),
        _ => None,
    }
}

#[inline]
fn token_to_binary_op(token: &Token<'_>) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Subtract),
        Token::Star => Some(BinaryOperator::Multiply),
        Token::Slash => Some(BinaryOperator::Divide),
        Token::Percent => Some(BinaryOperator::Modulo),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::BangEqual => Some(BinaryOperator::NotEqual),
        Token::EqualEqualEqual => Some(BinaryOperator::StrictEqual),
        Token::BangEqualEqual => Some(BinaryOperator::StrictNotEqual),
        Token::Less => Some(BinaryOperator::LessThan),
        Token::LessEqual => Some(BinaryOperator::LessThanOrEqual),
        Token::Greater => Some(BinaryOperator::GreaterThan),
        Token::GreaterEqual => Some(BinaryOperator::GreaterThanOrEqual),
        Token::AndAnd => Some(BinaryOperator::And),
        Token::OrOr => Some(BinaryOperator::Or),
        _ => None,
    }
}

/// Process backslash escapes in a raw string-literal body
fn process_string_escapes(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                // Quotes, backslashes, and unknown escapes keep the char
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parser over the token stream of a lambda body
pub struct Parser<'input> {
    tokenizer: Tokenizer<'input>,
    current: Option<Token<'input>>,
}

impl<'input> Parser<'input> {
    /// Create a parser positioned at the first token of the input
    pub fn new(input: &'input str) -> ParseResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Self { tokenizer, current })
    }

    #[inline]
    fn advance(&mut self) -> ParseResult<()> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    #[inline]
    fn current(&self) -> Option<&Token<'input>> {
        self.current.as_ref()
    }

    /// Byte offset of the current token
    fn position(&self) -> usize {
        self.tokenizer.token_start()
    }

    fn expect(&mut self, expected: Token<'input>, description: &str) -> ParseResult<()> {
        match &self.current {
            Some(token) if std::mem::discriminant(token) == std::mem::discriminant(&expected) => {
                self.advance()
            }
            Some(token) => Err(ParseError::ExpectedToken {
                expected: format!("{description}, found {token:?}"),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn expect_identifier(&mut self, description: &str) -> ParseResult<String> {
        match &self.current {
            Some(Token::Identifier(name)) => {
                let name = name.to_string();
                self.advance()?;
                Ok(name)
            }
            Some(token) => Err(ParseError::ExpectedToken {
                expected: format!("{description}, found {token:?}"),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Fail unless the whole input has been consumed
    pub fn expect_eof(&mut self) -> ParseResult<()> {
        match self.current() {
            None => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken {
                token: format!("{token:?}"),
                position: self.position(),
            }),
        }
    }

    /// Parse a full expression
    pub fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        self.parse_binary(Precedence::Or.as_u8())
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((op, precedence)) = self
                .current()
                .and_then(|t| Some((token_to_binary_op(t)?, get_precedence(t)?)))
            else {
                break;
            };
            if precedence.as_u8() < min_precedence {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(precedence.as_u8() + 1)?;
            left = ExpressionNode::binary_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<ExpressionNode> {
        let op = match self.current() {
            Some(Token::Minus) => Some(UnaryOperator::Minus),
            Some(Token::Plus) => Some(UnaryOperator::Plus),
            Some(Token::Bang) => Some(UnaryOperator::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_unary()?;
            Ok(ExpressionNode::unary_op(op, operand))
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> ParseResult<ExpressionNode> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current() {
                Some(Token::Dot) => {
                    self.advance()?;
                    let property = self.expect_identifier("property name after '.'")?;
                    expr = ExpressionNode::member(expr, property);
                }
                Some(Token::LeftBracket) => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(Token::RightBracket, "']'")?;
                    expr = ExpressionNode::index(expr, index);
                }
                Some(Token::LeftParen) => {
                    self.advance()?;
                    let args = self.parse_call_args()?;
                    expr = ExpressionNode::call(expr, args);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        match self.current() {
            Some(Token::Identifier(name)) => {
                let name = *name;
                self.advance()?;
                Ok(ExpressionNode::identifier(name))
            }
            Some(Token::Integer(value)) => {
                let value = *value;
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Integer(value)))
            }
            Some(Token::Decimal(text)) => {
                let text = *text;
                let position = self.position();
                // Validate eagerly so out-of-range literals fail at compile
                // time; the AST keeps the written form.
                text.parse::<Decimal>()
                    .map_err(|_| ParseError::InvalidLiteral {
                        literal_type: "decimal".to_string(),
                        value: text.to_string(),
                        position,
                    })?;
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Decimal(
                    text.to_string(),
                )))
            }
            Some(Token::String(raw)) => {
                let raw = *raw;
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::String(
                    process_string_escapes(raw),
                )))
            }
            Some(Token::True) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(true)))
            }
            Some(Token::False) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(false)))
            }
            Some(Token::Null) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Null))
            }
            Some(Token::LeftParen) => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RightParen, "')'")?;
                Ok(expr)
            }
            Some(Token::LeftBracket) => self.parse_array_literal(),
            Some(Token::LeftBrace) => self.parse_object_literal(),
            Some(token) => Err(ParseError::UnexpectedToken {
                token: format!("{token:?}"),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<ExpressionNode>> {
        let mut args = Vec::new();
        if matches!(self.current(), Some(Token::RightParen)) {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightParen) => {
                    self.advance()?;
                    break;
                }
                Some(token) => {
                    return Err(ParseError::ExpectedToken {
                        expected: format!("',' or ')', found {token:?}"),
                        position: self.position(),
                    });
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }
        Ok(args)
    }

    fn parse_array_literal(&mut self) -> ParseResult<ExpressionNode> {
        self.advance()?; // consume '['
        let mut items = Vec::new();
        if matches!(self.current(), Some(Token::RightBracket)) {
            self.advance()?;
            return Ok(ExpressionNode::Array(items));
        }
        loop {
            items.push(self.parse_expression()?);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightBracket) => {
                    self.advance()?;
                    break;
                }
                Some(token) => {
                    return Err(ParseError::ExpectedToken {
                        expected: format!("',' or ']', found {token:?}"),
                        position: self.position(),
                    });
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }
        Ok(ExpressionNode::Array(items))
    }

    fn parse_object_literal(&mut self) -> ParseResult<ExpressionNode> {
        self.advance()?; // consume '{'
        let mut entries = Vec::new();
        if matches!(self.current(), Some(Token::RightBrace)) {
            self.advance()?;
            return Ok(ExpressionNode::Object(entries));
        }
        loop {
            let key = match self.current() {
                Some(Token::Identifier(name)) => {
                    let key = name.to_string();
                    self.advance()?;
                    key
                }
                Some(Token::String(raw)) => {
                    let key = process_string_escapes(raw);
                    self.advance()?;
                    key
                }
                Some(token) => {
                    return Err(ParseError::ExpectedToken {
                        expected: format!("object key, found {token:?}"),
                        position: self.position(),
                    });
                }
                None => return Err(ParseError::UnexpectedEof),
            };
            self.expect(Token::Colon, "':'")?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightBrace) => {
                    self.advance()?;
                    break;
                }
                Some(token) => {
                    return Err(ParseError::ExpectedToken {
                        expected: format!("',' or '}}', found {token:?}"),
                        position: self.position(),
                    });
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }
        Ok(ExpressionNode::Object(entries))
    }

    /// Parse a brace-delimited statement block
    pub fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(Token::LeftBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            // Stray semicolons are empty statements
            while matches!(self.current(), Some(Token::Semicolon)) {
                self.advance()?;
            }
            match self.current() {
                Some(Token::RightBrace) => {
                    self.advance()?;
                    break;
                }
                None => return Err(ParseError::UnexpectedEof),
                _ => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current() {
            Some(Token::Var | Token::Let | Token::Const) => {
                self.advance()?;
                let name = self.expect_identifier("binding name")?;
                let init = if matches!(self.current(), Some(Token::Assign)) {
                    self.advance()?;
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                self.eat_semicolon()?;
                Ok(Statement::Declaration { name, init })
            }
            Some(Token::Return) => {
                self.advance()?;
                let value = match self.current() {
                    None | Some(Token::Semicolon) | Some(Token::RightBrace) => None,
                    _ => Some(self.parse_expression()?),
                };
                self.eat_semicolon()?;
                Ok(Statement::Return(value))
            }
            _ => {
                let expr = self.parse_expression()?;
                if matches!(self.current(), Some(Token::Assign)) {
                    let Some(name) = expr.as_identifier().map(str::to_string) else {
                        return Err(ParseError::syntax_error(
                            self.position(),
                            "invalid assignment target",
                        ));
                    };
                    self.advance()?;
                    let value = self.parse_expression()?;
                    self.eat_semicolon()?;
                    return Ok(Statement::Assignment { name, value });
                }
                self.eat_semicolon()?;
                Ok(Statement::Expression(expr))
            }
        }
    }

    fn eat_semicolon(&mut self) -> ParseResult<()> {
        if matches!(self.current(), Some(Token::Semicolon)) {
            self.advance()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse_block, parse_expression};
    use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, Statement};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_precedence() {
        let expr = parse_expression("1 + 2 * 3").expect("parse");
        assert_eq!(
            expr,
            ExpressionNode::binary_op(
                BinaryOperator::Add,
                ExpressionNode::literal(LiteralValue::Integer(1)),
                ExpressionNode::binary_op(
                    BinaryOperator::Multiply,
                    ExpressionNode::literal(LiteralValue::Integer(2)),
                    ExpressionNode::literal(LiteralValue::Integer(3)),
                ),
            )
        );
    }

    #[test]
    fn test_member_chain() {
        let expr = parse_expression("$.a.b[0]").expect("parse");
        assert_eq!(
            expr,
            ExpressionNode::index(
                ExpressionNode::member(
                    ExpressionNode::member(ExpressionNode::identifier("$"), "a"),
                    "b"
                ),
                ExpressionNode::literal(LiteralValue::Integer(0)),
            )
        );
    }

    #[test]
    fn test_parenthesized_object_literal() {
        let expr = parse_expression("({a: a, b: b})").expect("parse");
        assert_eq!(
            expr,
            ExpressionNode::Object(vec![
                ("a".to_string(), ExpressionNode::identifier("a")),
                ("b".to_string(), ExpressionNode::identifier("b")),
            ])
        );
    }

    #[test]
    fn test_call_expression() {
        let expr = parse_expression("f(x, 1)").expect("parse");
        assert_eq!(
            expr,
            ExpressionNode::call(
                ExpressionNode::identifier("f"),
                vec![
                    ExpressionNode::identifier("x"),
                    ExpressionNode::literal(LiteralValue::Integer(1)),
                ],
            )
        );
    }

    #[test]
    fn test_string_escapes() {
        let expr = parse_expression(r#"'a\nb\'c'"#).expect("parse");
        assert_eq!(
            expr,
            ExpressionNode::literal(LiteralValue::String("a\nb'c".to_string()))
        );
    }

    #[test]
    fn test_block_statements() {
        let statements = parse_block("{var c = a + b; return c;}").expect("parse");
        assert_eq!(
            statements,
            vec![
                Statement::Declaration {
                    name: "c".to_string(),
                    init: Some(ExpressionNode::binary_op(
                        BinaryOperator::Add,
                        ExpressionNode::identifier("a"),
                        ExpressionNode::identifier("b"),
                    )),
                },
                Statement::Return(Some(ExpressionNode::identifier("c"))),
            ]
        );
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(parse_block("{}").expect("parse"), vec![]);
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(parse_expression("a + b )").is_err());
    }

    #[test]
    fn test_unbalanced_brace_rejected() {
        assert!(parse_block("{var c = 1; return c").is_err());
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse_block("{a.b = 1;}").is_err());
    }
}
