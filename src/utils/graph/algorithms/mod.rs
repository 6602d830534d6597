//! Traversal algorithms over the [`Successors`](crate::utils::graph::Successors) and
//! [`Predecessors`](crate::utils::graph::Predecessors) traits.

mod traversal;

pub use traversal::{dfs, dfs_backward, postorder, reverse_postorder};
