//! Predecessor information for join detection.
//!
//! The translator never computes control flow over the instruction stream itself. It asks a
//! [`PredecessorOracle`] how many distinct instructions can transfer control to a given one
//! and opens a new block wherever that number exceeds one. Front-ends usually have this
//! information already; [`UnitGraph`] computes it for streams that come without.

use crate::{
    input::{Body, InstrId},
    utils::graph::{DirectedGraph, NodeId},
    Result,
};

/// Reports, per instruction, the number of distinct control-flow predecessors.
pub trait PredecessorOracle {
    /// Number of distinct instructions that can transfer control to `instr`.
    fn predecessor_count(&self, instr: InstrId) -> usize;
}

/// Precomputed counts indexed by instruction position; missing entries count as 0.
impl PredecessorOracle for Vec<usize> {
    fn predecessor_count(&self, instr: InstrId) -> usize {
        self.get(instr.index()).copied().unwrap_or(0)
    }
}

/// Instruction-level control-flow graph of a [`Body`].
///
/// Edges come from fallthrough and from explicit jump targets. Parallel edges are collapsed,
/// so a conditional jump to the very next instruction contributes one predecessor. Targets
/// outside the stream are ignored.
#[derive(Debug, Clone)]
pub struct UnitGraph {
    graph: DirectedGraph<InstrId, ()>,
}

impl UnitGraph {
    /// Builds the graph for `body`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if an edge cannot be added to the graph.
    pub fn new(body: &Body) -> Result<Self> {
        let mut graph = DirectedGraph::with_capacity(body.len(), body.len() + body.len() / 2);
        for (id, _) in body.iter() {
            graph.add_node(id);
        }

        for (id, instr) in body.iter() {
            let source = NodeId::new(id.index());
            let mut targets = instr.kind.jump_targets();
            if instr.kind.falls_through() {
                if let Some(next) = body.fallthrough(id) {
                    targets.push(next);
                }
            }

            for target in targets {
                let target = NodeId::new(target.index());
                if graph.contains_node(target) && graph.find_edge(source, target).is_none() {
                    graph.add_edge(source, target, ())?;
                }
            }
        }

        Ok(UnitGraph { graph })
    }

    /// Distinct predecessors of `instr`.
    pub fn predecessors(&self, instr: InstrId) -> impl Iterator<Item = InstrId> + '_ {
        self.graph
            .predecessors(NodeId::new(instr.index()))
            .map(|n| InstrId::new(n.index()))
    }

    /// Distinct successors of `instr`.
    pub fn successors(&self, instr: InstrId) -> impl Iterator<Item = InstrId> + '_ {
        self.graph
            .successors(NodeId::new(instr.index()))
            .map(|n| InstrId::new(n.index()))
    }
}

impl PredecessorOracle for UnitGraph {
    fn predecessor_count(&self, instr: InstrId) -> usize {
        self.graph.in_degree(NodeId::new(instr.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::BinaryOp,
        input::{BodyBuilder, InstructionKind, Value},
        types::{MethodRef, Type},
    };

    #[test]
    fn test_loop_header_has_two_predecessors() {
        let mut b = BodyBuilder::new(MethodRef::new("A", "loop", vec![], Type::Void));
        let i = b.local("i", Type::Int);
        b.assign(i, Value::int(0)); // #0
        b.label("head").unwrap();
        b.if_goto(Value::binary(BinaryOp::Ge, i.into(), Value::int(10)), "exit"); // #1
        b.assign(i, Value::binary(BinaryOp::Add, i.into(), Value::int(1))); // #2
        b.goto("head"); // #3
        b.label("exit").unwrap();
        b.ret_void(); // #4
        let body = b.finish().unwrap();

        let graph = UnitGraph::new(&body).unwrap();
        assert_eq!(graph.predecessor_count(InstrId::new(0)), 0);
        assert_eq!(graph.predecessor_count(InstrId::new(1)), 2);
        assert_eq!(graph.predecessor_count(InstrId::new(2)), 1);
        assert_eq!(graph.predecessor_count(InstrId::new(4)), 1);
        assert_eq!(
            graph.predecessors(InstrId::new(1)).collect::<Vec<_>>(),
            vec![InstrId::new(0), InstrId::new(3)]
        );
        // goto does not fall through
        assert_eq!(
            graph.successors(InstrId::new(3)).collect::<Vec<_>>(),
            vec![InstrId::new(1)]
        );
    }

    #[test]
    fn test_branch_to_next_counts_once() {
        let mut b = BodyBuilder::new(MethodRef::new("A", "f", vec![], Type::Void));
        b.if_goto(Value::int(1), "next");
        b.label("next").unwrap();
        b.ret_void();
        let body = b.finish().unwrap();

        assert_eq!(UnitGraph::new(&body).unwrap().predecessor_count(InstrId::new(1)), 1);
    }

    #[test]
    fn test_out_of_range_target_ignored() {
        let mut b = BodyBuilder::new(MethodRef::new("A", "wild", vec![], Type::Void));
        b.push(InstructionKind::Goto(InstrId::new(7)));
        b.ret_void();
        let body = b.finish().unwrap();

        let graph = UnitGraph::new(&body).unwrap();
        assert_eq!(graph.successors(InstrId::new(0)).count(), 0);
        assert_eq!(graph.predecessor_count(InstrId::new(1)), 0);
    }

    #[test]
    fn test_vec_oracle() {
        let counts = vec![0, 2];
        assert_eq!(counts.predecessor_count(InstrId::new(1)), 2);
        assert_eq!(counts.predecessor_count(InstrId::new(9)), 0);
    }
}
