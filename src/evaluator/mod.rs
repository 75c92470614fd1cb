//! Tree-walking evaluation of lambda bodies

pub mod context;
pub mod engine;
pub mod error;

pub use context::Scope;
pub use engine::{evaluate_block, evaluate_binary_operation, evaluate_expression};
pub use error::{EvalError, EvalResult};
