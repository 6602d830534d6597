//! Trait abstractions the graph algorithms are written against.
//!
//! - [`GraphBase`] - node count and node iteration
//! - [`Successors`] - forward adjacency
//! - [`Predecessors`] - backward adjacency
//!
//! Adjacency queries return iterators so simple traversals do not allocate.

use crate::utils::graph::NodeId;

/// Core graph properties shared by all graph abstractions.
pub trait GraphBase {
    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node identifiers, in ascending index order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Graphs that can enumerate the targets of a node's outgoing edges.
pub trait Successors: GraphBase {
    /// Returns an iterator over the direct successors of `node`.
    ///
    /// An unknown `node` yields an empty iterator.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Graphs that can enumerate the sources of a node's incoming edges.
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the direct predecessors of `node`.
    ///
    /// An unknown `node` yields an empty iterator.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}
