//! Depth-first traversals.
//!
//! Forward walks are used for reachability from a method's entry block and for the reverse
//! postorder block listing; the backward walk answers "which blocks can still reach the sink".

use crate::utils::graph::{NodeId, Predecessors, Successors};

/// Depth-first pre-order iterator over nodes reachable from a start node.
///
/// Created by [`dfs`]. Each reachable node is yielded exactly once; successors are visited
/// in their insertion order.
pub struct DfsIterator<'g, G: Successors> {
    graph: &'g G,
    stack: Vec<NodeId>,
    visited: Vec<bool>,
}

impl<'g, G: Successors> DfsIterator<'g, G> {
    fn new(graph: &'g G, start: NodeId) -> Self {
        let node_count = graph.node_count();
        if start.index() >= node_count {
            return DfsIterator {
                graph,
                stack: Vec::new(),
                visited: Vec::new(),
            };
        }

        let mut visited = vec![false; node_count];
        visited[start.index()] = true;

        DfsIterator {
            graph,
            stack: vec![start],
            visited,
        }
    }
}

impl<G: Successors> Iterator for DfsIterator<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        // Reverse so the first successor is popped first
        let successors: Vec<NodeId> = self.graph.successors(node).collect();
        for &succ in successors.iter().rev() {
            if !self.visited[succ.index()] {
                self.visited[succ.index()] = true;
                self.stack.push(succ);
            }
        }

        Some(node)
    }
}

/// Returns a depth-first pre-order iterator starting at `start`.
///
/// An out-of-range `start` yields nothing.
///
/// # Examples
///
/// ```rust
/// use cfglift::utils::graph::{algorithms::dfs, DirectedGraph};
///
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let a = graph.add_node("A");
/// let b = graph.add_node("B");
/// let c = graph.add_node("C");
/// graph.add_edge(a, b, ())?;
///
/// let reachable: Vec<_> = dfs(&graph, a).collect();
/// assert_eq!(reachable, vec![a, b]);
/// assert!(!reachable.contains(&c));
/// # Ok::<(), cfglift::Error>(())
/// ```
pub fn dfs<G: Successors>(graph: &G, start: NodeId) -> DfsIterator<'_, G> {
    DfsIterator::new(graph, start)
}

/// Collects every node from which `target` is reachable, `target` included.
///
/// Walks incoming edges depth-first; the result is in visitation order.
pub fn dfs_backward<G: Predecessors>(graph: &G, target: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if target.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::new();
    let mut stack = vec![target];
    visited[target.index()] = true;

    while let Some(node) = stack.pop() {
        result.push(node);
        for pred in graph.predecessors(node) {
            if !visited[pred.index()] {
                visited[pred.index()] = true;
                stack.push(pred);
            }
        }
    }

    result
}

/// Computes the postorder of nodes reachable from `start`.
///
/// A node is emitted after all of its (not yet visited) descendants.
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if start.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::with_capacity(node_count);

    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut stack = vec![(start, State::Enter)];

    while let Some((node, state)) = stack.pop() {
        match state {
            State::Enter => {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                stack.push((node, State::Exit));

                let successors: Vec<NodeId> = graph.successors(node).collect();
                for &succ in successors.iter().rev() {
                    if !visited[succ.index()] {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => result.push(node),
        }
    }

    result
}

/// Computes the reverse postorder of nodes reachable from `start`.
///
/// In an acyclic region every block comes before its successors, which makes this the
/// natural order for printing and for forward analyses over a translated method.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut result = postorder(graph, start);
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::traversal::{dfs, dfs_backward, postorder, reverse_postorder},
        DirectedGraph, NodeId,
    };

    fn create_linear_graph() -> DirectedGraph<&'static str, ()> {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let c = graph.add_node("C");
        graph.add_edge(a, b, ()).unwrap();
        graph.add_edge(b, c, ()).unwrap();
        graph
    }

    fn create_loop_graph() -> DirectedGraph<&'static str, ()> {
        // entry -> header <-> body, header -> exit, orphan
        let mut graph = DirectedGraph::new();
        let entry = graph.add_node("entry");
        let header = graph.add_node("header");
        let body = graph.add_node("body");
        let exit = graph.add_node("exit");
        graph.add_node("orphan");
        graph.add_edge(entry, header, ()).unwrap();
        graph.add_edge(header, body, ()).unwrap();
        graph.add_edge(body, header, ()).unwrap();
        graph.add_edge(header, exit, ()).unwrap();
        graph
    }

    #[test]
    fn test_dfs_linear() {
        let graph = create_linear_graph();
        let order: Vec<NodeId> = dfs(&graph, NodeId::new(0)).collect();
        assert_eq!(order, vec![NodeId::new(0), NodeId::new(1), NodeId::new(2)]);
    }

    #[test]
    fn test_dfs_loop_visits_once() {
        let graph = create_loop_graph();
        let order: Vec<NodeId> = dfs(&graph, NodeId::new(0)).collect();
        assert_eq!(order.len(), 4);
        assert!(!order.contains(&NodeId::new(4)));
    }

    #[test]
    fn test_dfs_invalid_start() {
        let graph = create_linear_graph();
        assert_eq!(dfs(&graph, NodeId::new(10)).count(), 0);
    }

    #[test]
    fn test_dfs_backward() {
        let graph = create_loop_graph();
        let mut reaching = dfs_backward(&graph, NodeId::new(3));
        reaching.sort();
        assert_eq!(
            reaching,
            vec![NodeId::new(0), NodeId::new(1), NodeId::new(2), NodeId::new(3)]
        );
        assert_eq!(dfs_backward(&graph, NodeId::new(4)), vec![NodeId::new(4)]);
    }

    #[test]
    fn test_postorder_linear() {
        let graph = create_linear_graph();
        assert_eq!(
            postorder(&graph, NodeId::new(0)),
            vec![NodeId::new(2), NodeId::new(1), NodeId::new(0)]
        );
    }

    #[test]
    fn test_reverse_postorder_with_loop() {
        let graph = create_loop_graph();
        let order = reverse_postorder(&graph, NodeId::new(0));
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], NodeId::new(0));
        assert_eq!(order[1], NodeId::new(1));
    }
}
