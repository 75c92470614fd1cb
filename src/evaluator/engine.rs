//! Tree-walking evaluator for lambda bodies
//!
//! Expressions evaluate to a [`Value`] in a read-only [`Scope`]; block
//! bodies additionally declare and assign locals. Semantics follow the
//! loose conventions of the source grammar: `+` concatenates when either
//! operand is a string, `/` always yields a decimal, and the logical
//! operators short-circuit and return operand values.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::context::Scope;
use super::error::{EvalError, EvalResult};
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, Statement, UnaryOperator};
use crate::value::Value;

/// Evaluate an expression AST node in the given scope
pub fn evaluate_expression(node: &ExpressionNode, scope: &Scope) -> EvalResult<Value> {
    match node {
        ExpressionNode::Literal(literal) => evaluate_literal(literal),

        ExpressionNode::Identifier(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::undefined_identifier(name)),

        ExpressionNode::BinaryOp { op, left, right } => match op {
            BinaryOperator::And => {
                let left_value = evaluate_expression(left, scope)?;
                if left_value.is_truthy() {
                    evaluate_expression(right, scope)
                } else {
                    Ok(left_value)
                }
            }
            BinaryOperator::Or => {
                let left_value = evaluate_expression(left, scope)?;
                if left_value.is_truthy() {
                    Ok(left_value)
                } else {
                    evaluate_expression(right, scope)
                }
            }
            _ => {
                let lhs = evaluate_expression(left, scope)?;
                let rhs = evaluate_expression(right, scope)?;
                evaluate_binary_operation(*op, &lhs, &rhs)
            }
        },

        ExpressionNode::UnaryOp { op, operand } => {
            let value = evaluate_expression(operand, scope)?;
            evaluate_unary_operation(*op, value)
        }

        ExpressionNode::Member { base, property } => {
            let base_value = evaluate_expression(base, scope)?;
            evaluate_member_access(&base_value, property)
        }

        ExpressionNode::Index { base, index } => {
            let base_value = evaluate_expression(base, scope)?;
            let index_value = evaluate_expression(index, scope)?;
            evaluate_index_access(&base_value, &index_value)
        }

        ExpressionNode::Call { callee, args } => {
            let callee_value = evaluate_expression(callee, scope)?;
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(evaluate_expression(arg, scope)?);
            }
            match callee_value {
                Value::Function(func) => func.call(&arg_values),
                other => Err(EvalError::not_a_function(other.type_name())),
            }
        }

        ExpressionNode::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate_expression(item, scope)?);
            }
            Ok(Value::Array(values))
        }

        ExpressionNode::Object(entries) => {
            let mut map = indexmap::IndexMap::with_capacity(entries.len());
            for (key, value_node) in entries {
                map.insert(key.clone(), evaluate_expression(value_node, scope)?);
            }
            Ok(Value::Object(map))
        }
    }
}

/// Evaluate a statement block; a block without `return` yields undefined
pub fn evaluate_block(statements: &[Statement], scope: &mut Scope) -> EvalResult<Value> {
    for statement in statements {
        match statement {
            Statement::Declaration { name, init } => {
                let value = match init {
                    Some(expr) => evaluate_expression(expr, scope)?,
                    None => Value::Undefined,
                };
                scope.bind(name.clone(), value);
            }
            Statement::Assignment { name, value } => {
                let value = evaluate_expression(value, scope)?;
                if !scope.assign(name, value) {
                    return Err(EvalError::undefined_identifier(name));
                }
            }
            Statement::Expression(expr) => {
                evaluate_expression(expr, scope)?;
            }
            Statement::Return(expr) => {
                return match expr {
                    Some(expr) => evaluate_expression(expr, scope),
                    None => Ok(Value::Undefined),
                };
            }
        }
    }
    Ok(Value::Undefined)
}

fn evaluate_literal(literal: &LiteralValue) -> EvalResult<Value> {
    Ok(match literal {
        LiteralValue::Boolean(b) => Value::Boolean(*b),
        LiteralValue::Integer(i) => Value::Integer(*i),
        LiteralValue::Decimal(text) => {
            Value::Decimal(Decimal::from_str(text).map_err(|_| EvalError::invalid_decimal(text))?)
        }
        LiteralValue::String(s) => Value::String(s.clone()),
        LiteralValue::Null => Value::Null,
    })
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(i) => Some(Decimal::from(*i)),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

fn decimal_operands(op: BinaryOperator, lhs: &Value, rhs: &Value) -> EvalResult<(Decimal, Decimal)> {
    match (as_decimal(lhs), as_decimal(rhs)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::type_error(format!(
            "cannot apply '{}' to {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

/// Evaluate a non-short-circuit binary operation on evaluated operands
pub fn evaluate_binary_operation(
    op: BinaryOperator,
    lhs: &Value,
    rhs: &Value,
) -> EvalResult<Value> {
    match op {
        BinaryOperator::Add => {
            if matches!(lhs, Value::String(_)) || matches!(rhs, Value::String(_)) {
                return Ok(Value::String(format!("{lhs}{rhs}")));
            }
            if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
                return a
                    .checked_add(*b)
                    .map(Value::Integer)
                    .ok_or_else(|| EvalError::arithmetic_error("integer overflow in addition"));
            }
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            a.checked_add(b)
                .map(Value::Decimal)
                .ok_or_else(|| EvalError::arithmetic_error("decimal overflow in addition"))
        }

        BinaryOperator::Subtract => {
            if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
                return a
                    .checked_sub(*b)
                    .map(Value::Integer)
                    .ok_or_else(|| EvalError::arithmetic_error("integer overflow in subtraction"));
            }
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            a.checked_sub(b)
                .map(Value::Decimal)
                .ok_or_else(|| EvalError::arithmetic_error("decimal overflow in subtraction"))
        }

        BinaryOperator::Multiply => {
            if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
                return a
                    .checked_mul(*b)
                    .map(Value::Integer)
                    .ok_or_else(|| EvalError::arithmetic_error("integer overflow in multiplication"));
            }
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            a.checked_mul(b)
                .map(Value::Decimal)
                .ok_or_else(|| EvalError::arithmetic_error("decimal overflow in multiplication"))
        }

        // Division always produces a decimal
        BinaryOperator::Divide => {
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            if b == Decimal::ZERO {
                return Err(EvalError::arithmetic_error("division by zero"));
            }
            a.checked_div(b)
                .map(Value::Decimal)
                .ok_or_else(|| EvalError::arithmetic_error("decimal overflow in division"))
        }

        BinaryOperator::Modulo => {
            if let (Value::Integer(a), Value::Integer(b)) = (lhs, rhs) {
                if *b == 0 {
                    return Err(EvalError::arithmetic_error("remainder by zero"));
                }
                return a
                    .checked_rem(*b)
                    .map(Value::Integer)
                    .ok_or_else(|| EvalError::arithmetic_error("integer overflow in remainder"));
            }
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            if b == Decimal::ZERO {
                return Err(EvalError::arithmetic_error("remainder by zero"));
            }
            a.checked_rem(b)
                .map(Value::Decimal)
                .ok_or_else(|| EvalError::arithmetic_error("decimal overflow in remainder"))
        }

        BinaryOperator::Equal => Ok(Value::Boolean(loose_eq(lhs, rhs))),
        BinaryOperator::NotEqual => Ok(Value::Boolean(!loose_eq(lhs, rhs))),
        BinaryOperator::StrictEqual => Ok(Value::Boolean(strict_eq(lhs, rhs))),
        BinaryOperator::StrictNotEqual => Ok(Value::Boolean(!strict_eq(lhs, rhs))),

        BinaryOperator::LessThan => compare_operands(op, lhs, rhs, |ordering| ordering.is_lt()),
        BinaryOperator::LessThanOrEqual => compare_operands(op, lhs, rhs, |ordering| ordering.is_le()),
        BinaryOperator::GreaterThan => compare_operands(op, lhs, rhs, |ordering| ordering.is_gt()),
        BinaryOperator::GreaterThanOrEqual => {
            compare_operands(op, lhs, rhs, |ordering| ordering.is_ge())
        }

        // Without expression context these cannot short-circuit; the
        // value-returning semantics still hold.
        BinaryOperator::And => Ok(if lhs.is_truthy() {
            rhs.clone()
        } else {
            lhs.clone()
        }),
        BinaryOperator::Or => Ok(if lhs.is_truthy() {
            lhs.clone()
        } else {
            rhs.clone()
        }),
    }
}

fn compare_operands(
    op: BinaryOperator,
    lhs: &Value,
    rhs: &Value,
    check: impl Fn(std::cmp::Ordering) -> bool,
) -> EvalResult<Value> {
    let ordering = match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => {
            let (a, b) = decimal_operands(op, lhs, rhs)?;
            a.cmp(&b)
        }
    };
    Ok(Value::Boolean(check(ordering)))
}

/// Numeric-aware equality: integers and decimals compare by value
fn strict_eq(lhs: &Value, rhs: &Value) -> bool {
    match (as_decimal(lhs), as_decimal(rhs)) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

/// Loose equality additionally treats null and undefined as equal
fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    if matches!(lhs, Value::Undefined | Value::Null)
        && matches!(rhs, Value::Undefined | Value::Null)
    {
        return true;
    }
    strict_eq(lhs, rhs)
}

fn evaluate_unary_operation(op: UnaryOperator, value: Value) -> EvalResult<Value> {
    match op {
        UnaryOperator::Minus => match value {
            Value::Integer(i) => i
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| EvalError::arithmetic_error("integer overflow in negation")),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            other => Err(EvalError::type_error(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        },
        UnaryOperator::Plus => match value {
            Value::Integer(_) | Value::Decimal(_) => Ok(value),
            other => Err(EvalError::type_error(format!(
                "cannot apply unary '+' to {}",
                other.type_name()
            ))),
        },
        UnaryOperator::Not => Ok(Value::Boolean(!value.is_truthy())),
    }
}

fn evaluate_member_access(base: &Value, property: &str) -> EvalResult<Value> {
    match base {
        Value::Undefined | Value::Null => {
            Err(EvalError::absent_member(property, base.type_name()))
        }
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or_default()),
        Value::Array(items) if property == "length" => Ok(Value::Integer(items.len() as i64)),
        Value::String(s) if property == "length" => {
            Ok(Value::Integer(s.chars().count() as i64))
        }
        _ => Ok(Value::Undefined),
    }
}

fn index_position(index: &Value) -> Option<usize> {
    match index {
        Value::Integer(i) if *i >= 0 => Some(*i as usize),
        _ => None,
    }
}

fn evaluate_index_access(base: &Value, index: &Value) -> EvalResult<Value> {
    match base {
        Value::Undefined | Value::Null => {
            Err(EvalError::absent_member(index.to_string(), base.type_name()))
        }
        Value::Array(items) => Ok(index_position(index)
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or_default()),
        Value::Object(map) => Ok(map.get(&index.to_string()).cloned().unwrap_or_default()),
        Value::String(s) => Ok(index_position(index)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        _ => Ok(Value::Undefined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_block, parse_expression};
    use pretty_assertions::assert_eq;

    fn eval(input: &str, scope: &Scope) -> EvalResult<Value> {
        evaluate_expression(&parse_expression(input).expect("parse"), scope)
    }

    fn scope_with(entries: &[(&str, Value)]) -> Scope {
        let mut scope = Scope::new();
        for (name, value) in entries {
            scope.bind(*name, value.clone());
        }
        scope
    }

    #[test]
    fn test_arithmetic() {
        let scope = Scope::new();
        assert_eq!(eval("1 + 2 * 3", &scope), Ok(Value::Integer(7)));
        assert_eq!(eval("(1 + 2) * 3", &scope), Ok(Value::Integer(9)));
        assert_eq!(eval("7 % 4", &scope), Ok(Value::Integer(3)));
        assert_eq!(
            eval("5 / 2", &scope),
            Ok(Value::Decimal(Decimal::new(25, 1)))
        );
        assert_eq!(
            eval("1 / 0", &scope),
            Err(EvalError::arithmetic_error("division by zero"))
        );
    }

    #[test]
    fn test_string_concatenation() {
        let scope = scope_with(&[("a", Value::Integer(1))]);
        assert_eq!(
            eval("'n=' + a", &scope),
            Ok(Value::String("n=1".to_string()))
        );
    }

    #[test]
    fn test_comparisons() {
        let scope = Scope::new();
        assert_eq!(eval("2 < 2.5", &scope), Ok(Value::Boolean(true)));
        assert_eq!(eval("'a' < 'b'", &scope), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 == 1.0", &scope), Ok(Value::Boolean(true)));
        assert_eq!(eval("null == null", &scope), Ok(Value::Boolean(true)));
        assert_eq!(eval("1 === 2", &scope), Ok(Value::Boolean(false)));
        assert!(eval("1 < 'a'", &scope).is_err());
    }

    #[test]
    fn test_logical_operators_return_operands() {
        let scope = scope_with(&[("a", Value::Integer(0)), ("b", Value::Integer(9))]);
        assert_eq!(eval("a && b", &scope), Ok(Value::Integer(0)));
        assert_eq!(eval("a || b", &scope), Ok(Value::Integer(9)));
        assert_eq!(eval("b && a", &scope), Ok(Value::Integer(0)));
        assert_eq!(eval("!a", &scope), Ok(Value::Boolean(true)));
        // Right side must not evaluate when the left decides
        assert_eq!(eval("b || missing", &scope), Ok(Value::Integer(9)));
    }

    #[test]
    fn test_member_and_index_access() {
        let scope = scope_with(&[(
            "$",
            Value::from(serde_json::json!({"a": 5, "items": [10, 20]})),
        )]);
        assert_eq!(eval("$.a", &scope), Ok(Value::Integer(5)));
        assert_eq!(eval("$.items[1]", &scope), Ok(Value::Integer(20)));
        assert_eq!(eval("$.items.length", &scope), Ok(Value::Integer(2)));
        assert_eq!(eval("$.items[9]", &scope), Ok(Value::Undefined));
        assert_eq!(eval("$.missing", &scope), Ok(Value::Undefined));
        assert_eq!(
            eval("$.missing.deeper", &scope),
            Err(EvalError::absent_member("deeper", "undefined"))
        );
    }

    #[test]
    fn test_undefined_identifier() {
        let scope = Scope::new();
        assert_eq!(
            eval("nowhere", &scope),
            Err(EvalError::undefined_identifier("nowhere"))
        );
    }

    #[test]
    fn test_call_expression() {
        use crate::value::NativeCallable;
        let double = NativeCallable::new(["x"], "return x * 2;", |args| {
            evaluate_binary_operation(
                BinaryOperator::Multiply,
                args.first().unwrap_or(&Value::Undefined),
                &Value::Integer(2),
            )
        });
        let scope = scope_with(&[("f", Value::Function(double))]);
        assert_eq!(eval("f(21)", &scope), Ok(Value::Integer(42)));
        assert_eq!(
            eval("f(21)(1)", &scope),
            Err(EvalError::not_a_function("integer"))
        );
    }

    #[test]
    fn test_block_evaluation() {
        let statements = parse_block("{var c = a + b; c = c * 2; return c;}").expect("parse");
        let mut scope = scope_with(&[("a", Value::Integer(2)), ("b", Value::Integer(3))]);
        assert_eq!(evaluate_block(&statements, &mut scope), Ok(Value::Integer(10)));
    }

    #[test]
    fn test_block_without_return_yields_undefined() {
        let statements = parse_block("{var c = 1;}").expect("parse");
        let mut scope = Scope::new();
        assert_eq!(evaluate_block(&statements, &mut scope), Ok(Value::Undefined));
    }

    #[test]
    fn test_assignment_to_undeclared_name_fails() {
        let statements = parse_block("{c = 1;}").expect("parse");
        let mut scope = Scope::new();
        assert_eq!(
            evaluate_block(&statements, &mut scope),
            Err(EvalError::undefined_identifier("c"))
        );
    }
}
