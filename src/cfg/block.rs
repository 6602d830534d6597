//! Blocks and edges of a translated method.

use std::fmt;

use crate::cfg::{Expression, Statement};

/// A basic block: a label and an ordered sequence of statements.
///
/// Identity is the [`NodeId`](crate::utils::graph::NodeId) the block occupies in its
/// method's graph; the label is for display only.
#[derive(Debug, Clone, PartialEq)]
pub struct CfgBlock {
    label: String,
    statements: Vec<Statement>,
}

impl CfgBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        CfgBlock {
            label: label.into(),
            statements: Vec::new(),
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the block has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A control-flow edge.
///
/// Without a label the transfer is unconditional. A labelled edge is taken when its guard
/// holds; the two edges leaving a conditional carry `cond` and `!cond` as separate trees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Edge {
    label: Option<Expression>,
}

impl Edge {
    /// An unconditional edge.
    #[must_use]
    pub fn unconditional() -> Self {
        Edge { label: None }
    }

    /// An edge guarded by `condition`.
    #[must_use]
    pub fn guarded(condition: Expression) -> Self {
        Edge {
            label: Some(condition),
        }
    }

    /// The guard, if any.
    #[must_use]
    pub fn label(&self) -> Option<&Expression> {
        self.label.as_ref()
    }

    /// Returns true for guarded edges.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.label.is_some()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}"),
            None => Ok(()),
        }
    }
}
