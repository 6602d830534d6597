//! Generic directed-graph arena.
//!
//! Nodes and edges live in vectors and are addressed by [`NodeId`] / [`EdgeId`]. Adjacency is
//! kept in both directions so predecessor queries are as cheap as successor queries, which
//! the block builder needs for join detection and the reachability helpers need for
//! backwards walks.
//!
//! - [`DirectedGraph`] - the arena itself
//! - [`GraphBase`], [`Successors`], [`Predecessors`] - what [`algorithms`] are written against

mod directed;
mod ids;
mod traits;

pub mod algorithms;

pub use directed::DirectedGraph;
pub use ids::{EdgeId, NodeId};
pub use traits::{GraphBase, Predecessors, Successors};
