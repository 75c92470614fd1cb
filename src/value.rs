//! Runtime value model
//!
//! Values passed into and produced by compiled lambdas. The domain mirrors
//! JSON (null, booleans, numbers, strings, arrays, insertion-ordered
//! objects) plus two members JSON does not have: [`Value::Undefined`], the
//! explicit "no value" sentinel bound to unmatched parameters, and
//! [`Value::Function`], a native callable usable from call expressions.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::EvalError;

/// Signature of the closure backing a [`NativeCallable`]
pub type NativeFn = dyn Fn(&[Value]) -> std::result::Result<Value, EvalError> + Send + Sync;

/// Runtime values produced and consumed by compiled lambdas
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The "no value" sentinel; bound to unmatched fixed parameters and
    /// returned by blocks that finish without `return`
    #[default]
    Undefined,
    /// Null literal
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Decimal value (fractional literals and division results)
    Decimal(Decimal),
    /// String value
    String(String),
    /// Ordered array of values
    Array(Vec<Value>),
    /// Object with insertion-ordered keys
    Object(IndexMap<String, Value>),
    /// Native callable wrapped as a value
    Function(NativeCallable),
}

impl Value {
    /// Truthiness used by logical operators: undefined, null, `false`,
    /// zero, and the empty string are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Decimal(d) => *d != Decimal::ZERO,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Name of this value's kind, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Get an object member by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Get the integer value if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check for the undefined sentinel
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(func) => f.write_str(&func.source_text()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(d) = n.as_f64().and_then(Decimal::from_f64) {
                    Value::Decimal(d)
                } else {
                    Value::Null
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Undefined | Value::Null => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(b),
            Value::Integer(i) => JsonValue::from(i),
            Value::Decimal(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s),
            Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            Value::Object(map) => {
                JsonValue::Object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect())
            }
            Value::Function(func) => JsonValue::String(func.source_text()),
        }
    }
}

/// A native Rust callable wrapped for use as a lambda or a value
///
/// The declared parameter list and body text stand in for source reflection:
/// they are what the canonical `"(<params>)=>{<body>}"` rendering is built
/// from, so the body text should describe what the closure actually does if
/// round-trip reconstruction matters to the caller.
#[derive(Clone)]
pub struct NativeCallable {
    params: Vec<String>,
    body: String,
    func: Arc<NativeFn>,
}

impl NativeCallable {
    /// Wrap a closure together with its declared signature and body text
    pub fn new<P, S, F>(params: P, body: impl Into<String>, func: F) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value]) -> std::result::Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            body: body.into(),
            func: Arc::new(func),
        }
    }

    /// Declared parameter names
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Declared body text, without the surrounding braces
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Canonical source rendering, `"(<params>)=>{<body>}"`
    pub fn source_text(&self) -> String {
        format!("({})=>{{{}}}", self.params.join(", "), self.body)
    }

    /// Invoke the wrapped closure
    pub fn call(&self, args: &[Value]) -> std::result::Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallable")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for NativeCallable {
    fn eq(&self, other: &Self) -> bool {
        // Identity comparison: two natives are equal only when they wrap
        // the same closure instance.
        Arc::ptr_eq(&self.func, &other.func)
    }
}
