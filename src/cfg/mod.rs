//! The control-flow-graph IR produced by translation.
//!
//! # Key Components
//!
//! - [`Expression`] - immutable expression trees over [`Variable`]s
//! - [`Statement`] - assignment, assertion, assumption and call
//! - [`CfgBlock`] / [`Edge`] - blocks and optionally guarded edges
//! - [`Method`] / [`MethodBody`] - the program-wide callee identity and its translated graph
//!
//! Everything here is built by [`crate::translator`] and treated as immutable afterwards.
//! A later pass that wants to rewrite an expression works on a [`Expression::deep_copy`].

mod block;
mod expression;
mod location;
mod method;
mod statement;
mod variable;

pub use block::{CfgBlock, Edge};
pub use expression::{BinaryOp, Expression, Literal, UnaryOp};
pub use location::SourceLocation;
pub use method::{Method, MethodBody, MethodRc};
pub use statement::{CallTarget, Statement, StatementKind};
pub use variable::{VarId, Variable, VariableKind, VariableRc};
