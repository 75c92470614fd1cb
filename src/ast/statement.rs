//! Statement AST for block bodies
//!
//! Block bodies support the declaration-plus-return subset: local variable
//! declarations, assignments to already-bound names, expression statements,
//! and explicit `return`.

use crate::ast::expression::ExpressionNode;

/// A single statement inside a block body
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Local variable declaration (`var`/`let`/`const name = expr;`)
    Declaration {
        /// Declared name
        name: String,
        /// Initializer; absent declarations bind the undefined sentinel
        init: Option<ExpressionNode>,
    },

    /// Assignment to a parameter or previously declared local
    Assignment {
        /// Target name
        name: String,
        /// New value
        value: ExpressionNode,
    },

    /// Expression evaluated for effect, result discarded
    Expression(ExpressionNode),

    /// Explicit return; a bare `return;` yields the undefined sentinel
    Return(Option<ExpressionNode>),
}
