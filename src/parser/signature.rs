//! Signature splitting for lambda definitions
//!
//! Splits raw definition text into a parameter list and a body using the
//! tokenizer's notion of nesting depth, so `=>` inside braces, brackets, or
//! string literals never splits the wrong place.

use log::trace;

use super::error::{ParseError, ParseResult};
use super::tokenizer::{Token, Tokenizer};

/// Body classification of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Single expression, compiled with an implicit return
    Expression,
    /// Brace-delimited statement sequence
    Block,
}

/// Trailing rest parameter of a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestParam {
    /// Name the surplus-argument array binds to
    pub name: String,
    /// Count of fixed parameters before the rest parameter
    pub position: usize,
}

/// Parsed split of a definition into parameters and body
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Fixed parameter names, in order
    pub params: Vec<String>,
    /// Optional trailing rest parameter
    pub rest: Option<RestParam>,
    /// Body text (right of the arrow, or the whole definition)
    pub body: String,
    /// Whether the body is an expression or a statement block
    pub body_kind: BodyKind,
}

/// Split definition text into a signature
///
/// With no top-level `=>`, the definition is a bare body over the implicit
/// self parameter. Otherwise the text left of the first top-level arrow is
/// the parameter list and everything right of it is the body.
pub fn parse_signature(text: &str, self_symbol: &str) -> ParseResult<Signature> {
    match find_top_level_arrow(text)? {
        Some(arrow_at) => {
            trace!("arrow at byte {arrow_at}");
            let (params, rest) = parse_parameter_list(&text[..arrow_at])?;
            let body = &text[arrow_at + 2..];
            Ok(Signature {
                params,
                rest,
                body_kind: classify_body(body),
                body: body.to_string(),
            })
        }
        None => Ok(Signature {
            params: vec![self_symbol.to_string()],
            rest: None,
            body_kind: classify_body(text),
            body: text.to_string(),
        }),
    }
}

fn classify_body(body: &str) -> BodyKind {
    // `({...})` bodies start with '(' and stay expressions, which is what
    // disambiguates returned object literals from statement blocks.
    if body.trim_start().starts_with('{') {
        BodyKind::Block
    } else {
        BodyKind::Expression
    }
}

/// Find the byte offset of the first `=>` outside any delimiter nesting
fn find_top_level_arrow(text: &str) -> ParseResult<Option<usize>> {
    let mut tokenizer = Tokenizer::new(text);
    let mut depth: usize = 0;
    while let Some(token) = tokenizer.next_token()? {
        match token {
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                depth = depth.saturating_sub(1);
            }
            Token::Arrow if depth == 0 => return Ok(Some(tokenizer.token_start())),
            _ => {}
        }
    }
    Ok(None)
}

/// Parse parameter-list text into fixed names and an optional rest parameter
fn parse_parameter_list(text: &str) -> ParseResult<(Vec<String>, Option<RestParam>)> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }

    // Strip one optional pair of wrapping parentheses
    let inner: &[Token<'_>] = match tokens.as_slice() {
        [Token::LeftParen, inner @ .., Token::RightParen] => inner,
        other => other,
    };

    let mut params = Vec::new();
    let mut rest: Option<RestParam> = None;
    let mut i = 0;
    while i < inner.len() {
        if rest.is_some() {
            return Err(ParseError::MisplacedRestParameter {
                text: text.trim().to_string(),
            });
        }
        match &inner[i] {
            Token::Ellipsis => {
                let Some(name) = inner.get(i + 1).and_then(Token::as_identifier) else {
                    return Err(ParseError::invalid_signature(
                        "expected parameter name after '...'",
                        text.trim(),
                    ));
                };
                rest = Some(RestParam {
                    name: name.to_string(),
                    position: params.len(),
                });
                i += 2;
            }
            Token::Identifier(name) => {
                params.push(name.to_string());
                i += 1;
            }
            token => {
                return Err(ParseError::invalid_signature(
                    format!("expected parameter name, found {token:?}"),
                    text.trim(),
                ));
            }
        }
        match inner.get(i) {
            None => break,
            Some(Token::Comma) => i += 1,
            Some(token) => {
                return Err(ParseError::invalid_signature(
                    format!("expected ',', found {token:?}"),
                    text.trim(),
                ));
            }
        }
        if i == inner.len() {
            return Err(ParseError::invalid_signature("trailing comma", text.trim()));
        }
    }
    Ok((params, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_expression_uses_self_symbol() {
        let signature = parse_signature("$.a+$.b", "$").expect("signature");
        assert_eq!(signature.params, vec!["$".to_string()]);
        assert_eq!(signature.rest, None);
        assert_eq!(signature.body, "$.a+$.b");
        assert_eq!(signature.body_kind, BodyKind::Expression);
    }

    #[test]
    fn test_bare_block() {
        let signature = parse_signature("{var c = $.a; return c;}", "$").expect("signature");
        assert_eq!(signature.params, vec!["$".to_string()]);
        assert_eq!(signature.body_kind, BodyKind::Block);
    }

    #[test]
    fn test_unparenthesized_arrow() {
        let signature = parse_signature("a, b => a + b", "$").expect("signature");
        assert_eq!(signature.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(signature.body, " a + b");
        assert_eq!(signature.body_kind, BodyKind::Expression);
    }

    #[test]
    fn test_parenthesized_arrow_block() {
        let signature = parse_signature("(a, b) => {\nreturn a;\n}", "$").expect("signature");
        assert_eq!(signature.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(signature.body_kind, BodyKind::Block);
    }

    #[test]
    fn test_object_literal_body_is_expression() {
        let signature = parse_signature("(a, b) => ({a: a, b: b})", "$").expect("signature");
        assert_eq!(signature.body_kind, BodyKind::Expression);
    }

    #[test]
    fn test_empty_parameter_list() {
        let signature = parse_signature("() => 'foobar'", "$").expect("signature");
        assert_eq!(signature.params, Vec::<String>::new());
        assert_eq!(signature.rest, None);
    }

    #[test]
    fn test_rest_parameter() {
        let signature = parse_signature("(a, b, ...args) => args", "$").expect("signature");
        assert_eq!(signature.params, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            signature.rest,
            Some(RestParam {
                name: "args".to_string(),
                position: 2,
            })
        );
    }

    #[test]
    fn test_rest_only() {
        let signature = parse_signature("(...args) => args", "$").expect("signature");
        assert_eq!(signature.params, Vec::<String>::new());
        assert_eq!(
            signature.rest,
            Some(RestParam {
                name: "args".to_string(),
                position: 0,
            })
        );
    }

    #[test]
    fn test_misplaced_rest_rejected() {
        assert_eq!(
            parse_signature("(...args, a) => a", "$"),
            Err(ParseError::MisplacedRestParameter {
                text: "(...args, a)".to_string(),
            })
        );
    }

    #[test]
    fn test_double_rest_rejected() {
        assert!(parse_signature("(...a, ...b) => a", "$").is_err());
    }

    #[test]
    fn test_non_identifier_parameter_rejected() {
        assert!(parse_signature("(a + b) => a", "$").is_err());
    }

    #[test]
    fn test_arrow_inside_string_is_not_a_split() {
        let signature = parse_signature("({x: 'a=>b'})", "$").expect("signature");
        assert_eq!(signature.params, vec!["$".to_string()]);
        assert_eq!(signature.body_kind, BodyKind::Expression);
    }

    #[test]
    fn test_arrow_inside_nesting_is_not_a_split() {
        // Only a depth-0 arrow splits; one inside parentheses does not
        let signature = parse_signature("f((x) => x)", "$").expect("signature");
        assert_eq!(signature.params, vec!["$".to_string()]);
        assert_eq!(signature.body, "f((x) => x)");
    }

    #[test]
    fn test_custom_self_symbol() {
        let signature = parse_signature("self.a + self.b", "self").expect("signature");
        assert_eq!(signature.params, vec!["self".to_string()]);
    }
}
