//! Shared utilities: the graph arena the CFG is built on, and DOT escaping.

mod dot;
pub mod graph;

pub use dot::escape_dot;
