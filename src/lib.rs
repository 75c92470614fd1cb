//! Arrow-lambda: textual expression definitions compiled into callable lambdas
//!
//! This crate turns strings written in a constrained arrow-function syntax
//! into invocable [`Lambda`] objects, so behavior can be supplied as data
//! (configuration, rules, templates) instead of compiled code. Definitions
//! are parsed by an embedded tokenizer and Pratt parser and executed by a
//! tree-walking evaluator over a parameter-name environment.
//!
//! ```
//! use arrow_lambda::{Lambda, Value};
//! use serde_json::json;
//!
//! // Dot-shorthand over the implicit `$` context parameter
//! let sum = Lambda::from_expression("$.a+$.b")?;
//! assert_eq!(sum.execute(&[Value::from(json!({"a": 5, "b": 2}))])?, Value::Integer(7));
//!
//! // Explicit parameters and rest arguments
//! let tail = Lambda::from_expression("(a, b, ...rest) => rest")?;
//! let out = tail.execute(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)])?;
//! assert_eq!(out, Value::Array(vec![Value::Integer(3)]));
//!
//! // The definition text round-trips verbatim
//! assert_eq!(tail.source_text(), "(a, b, ...rest) => rest");
//! # Ok::<(), arrow_lambda::LambdaError>(())
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lambda;
pub mod parser;
pub mod value;

// Re-export main types
pub use error::{LambdaError, Result};
pub use evaluator::{EvalError, Scope};
pub use lambda::{CompiledLambda, DEFAULT_SELF_SYMBOL, Definition, Lambda, LambdaConfig};
pub use parser::ParseError;
pub use value::{NativeCallable, Value};
