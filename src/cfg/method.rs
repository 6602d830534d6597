//! Methods and their translated bodies.
//!
//! A [`Method`] is the program-wide identity of a callee: call statements in any body refer
//! to the same `Arc<Method>` for the same signature, held weakly so recursion forms no cycle. Its [`MethodBody`] is installed at most
//! once, when (and if) that method's own instruction stream is translated.

use std::{
    fmt::{self, Write},
    sync::{Arc, OnceLock},
};

use crate::{
    cfg::{CfgBlock, Edge, Statement, VariableRc},
    types::MethodRef,
    utils::{
        escape_dot,
        graph::{
            algorithms::{dfs, dfs_backward, reverse_postorder},
            DirectedGraph, NodeId,
        },
    },
    Error, Result,
};

/// Shared handle to a [`Method`].
pub type MethodRc = Arc<Method>;

/// A method known to the program, with or without a translated body.
pub struct Method {
    method_ref: MethodRef,
    signature: String,
    body: OnceLock<MethodBody>,
}

impl Method {
    /// Creates a method without body.
    #[must_use]
    pub fn new(method_ref: MethodRef) -> Self {
        Method {
            signature: method_ref.signature(),
            method_ref,
            body: OnceLock::new(),
        }
    }

    /// Full signature, the method's cache key.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Declaring class, name and types.
    #[must_use]
    pub fn method_ref(&self) -> &MethodRef {
        &self.method_ref
    }

    /// The translated body, if this method has been translated.
    #[must_use]
    pub fn body(&self) -> Option<&MethodBody> {
        self.body.get()
    }

    /// Returns true once a body has been installed.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.get().is_some()
    }

    /// Installs the translated body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyAlreadyTranslated`] if a body is already present.
    pub(crate) fn install(&self, body: MethodBody) -> Result<()> {
        self.body
            .set(body)
            .map_err(|_| Error::BodyAlreadyTranslated(self.signature.clone()))
    }
}

// Bodies may call back into this method, so only the signature is printed.
impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature)
            .field("has_body", &self.has_body())
            .finish()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature)
    }
}

/// The control-flow graph of one translated method.
///
/// Every block is a node of the underlying [`DirectedGraph`]; there is at most one edge per
/// ordered block pair. All returning paths end in the unique [`sink`](MethodBody::sink),
/// which never has statements or successors.
#[derive(Debug)]
pub struct MethodBody {
    pub(crate) graph: DirectedGraph<CfgBlock, Edge>,
    pub(crate) entry: NodeId,
    pub(crate) sink: NodeId,
    pub(crate) return_variable: Option<VariableRc>,
    pub(crate) this_variable: Option<VariableRc>,
    pub(crate) parameters: Vec<VariableRc>,
    pub(crate) locals: Vec<VariableRc>,
    pub(crate) is_synchronized: bool,
    pub(crate) uses_monitors: bool,
}

impl MethodBody {
    /// The block control enters first.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// The unique block all returning paths converge on.
    #[must_use]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// The variable returned values are assigned to; `None` for void methods.
    #[must_use]
    pub fn return_variable(&self) -> Option<&VariableRc> {
        self.return_variable.as_ref()
    }

    /// The receiver variable of an instance method.
    #[must_use]
    pub fn this_variable(&self) -> Option<&VariableRc> {
        self.this_variable.as_ref()
    }

    /// Parameter variables in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[VariableRc] {
        &self.parameters
    }

    /// Source locals followed by translation temporaries.
    #[must_use]
    pub fn locals(&self) -> &[VariableRc] {
        &self.locals
    }

    /// Returns true if the source method was declared synchronized.
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.is_synchronized
    }

    /// Returns true if the body entered a monitor region.
    ///
    /// Synchronization is not modelled, so such a body only describes single-threaded runs.
    #[must_use]
    pub fn uses_monitors(&self) -> bool {
        self.uses_monitors
    }

    /// The underlying graph, for use with [`crate::utils::graph::algorithms`].
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph<CfgBlock, Edge> {
        &self.graph
    }

    /// Returns the block with the given id.
    #[must_use]
    pub fn block(&self, id: NodeId) -> Option<&CfgBlock> {
        self.graph.node(id)
    }

    /// Iterates over all blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (NodeId, &CfgBlock)> + '_ {
        self.graph.nodes()
    }

    /// Number of blocks, sink included.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all edges as `(from, to, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &Edge)> + '_ {
        self.graph.edges().map(|(_, from, to, edge)| (from, to, edge))
    }

    /// Iterates over the outgoing edges of `block` as `(to, edge)`.
    pub fn outgoing(&self, block: NodeId) -> impl Iterator<Item = (NodeId, &Edge)> + '_ {
        self.graph.outgoing_edges(block).map(|(_, to, edge)| (to, edge))
    }

    /// Iterates over the incoming edges of `block` as `(from, edge)`.
    pub fn incoming(&self, block: NodeId) -> impl Iterator<Item = (NodeId, &Edge)> + '_ {
        self.graph.incoming_edges(block).map(|(_, from, edge)| (from, edge))
    }

    /// Successor blocks of `block`.
    pub fn successors(&self, block: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.successors(block)
    }

    /// Predecessor blocks of `block`.
    pub fn predecessors(&self, block: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.predecessors(block)
    }

    /// The edge `from -> to`, if present.
    #[must_use]
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.graph
            .find_edge(from, to)
            .and_then(|id| self.graph.edge(id))
    }

    /// Iterates over every statement with the block that holds it.
    pub fn statements(&self) -> impl Iterator<Item = (NodeId, &Statement)> + '_ {
        self.graph
            .nodes()
            .flat_map(|(id, block)| block.statements().iter().map(move |s| (id, s)))
    }

    /// Blocks reachable from the entry, in depth-first pre-order.
    #[must_use]
    pub fn reachable_from_entry(&self) -> Vec<NodeId> {
        dfs(&self.graph, self.entry).collect()
    }

    /// Returns true if the sink is reachable from `block`.
    #[must_use]
    pub fn reaches_sink(&self, block: NodeId) -> bool {
        dfs(&self.graph, block).any(|id| id == self.sink)
    }

    /// Blocks from which the sink is reachable.
    #[must_use]
    pub fn blocks_reaching_sink(&self) -> Vec<NodeId> {
        dfs_backward(&self.graph, self.sink)
    }

    /// Blocks reachable from the entry in reverse postorder.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<NodeId> {
        reverse_postorder(&self.graph, self.entry)
    }

    /// Renders the body as a Graphviz digraph.
    ///
    /// Entry and sink are highlighted; guarded edges are labelled with their condition.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        for (id, block) in self.graph.nodes() {
            let mut label = escape_dot(block.label());
            if id == self.entry {
                label.push_str(" (entry)");
            }
            if id == self.sink {
                label.push_str(" (sink)");
            }
            label.push_str("\\l");
            for statement in block.statements() {
                label.push_str(&escape_dot(&statement.to_string()));
                label.push_str("\\l");
            }

            let style = if id == self.entry {
                ", style=filled, fillcolor=lightgreen"
            } else if id == self.sink {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };
            let _ = writeln!(dot, "    B{} [label=\"{label}\"{style}];", id.index());
        }

        dot.push('\n');

        for (from, to, edge) in self.edges() {
            match edge.label() {
                Some(guard) => {
                    let _ = writeln!(
                        dot,
                        "    B{} -> B{} [label=\"{}\"];",
                        from.index(),
                        to.index(),
                        escape_dot(&guard.to_string())
                    );
                }
                None => {
                    let _ = writeln!(dot, "    B{} -> B{};", from.index(), to.index());
                }
            }
        }

        dot.push_str("}\n");
        dot
    }
}

impl fmt::Display for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, block) in self.graph.nodes() {
            writeln!(f, "{}:", block.label())?;
            for statement in block.statements() {
                writeln!(f, "    {statement}")?;
            }
            for (to, edge) in self.outgoing(id) {
                let target = self.block(to).map_or("?", CfgBlock::label);
                match edge.label() {
                    Some(guard) => writeln!(f, "    goto {target} if {guard}")?,
                    None => writeln!(f, "    goto {target}")?,
                }
            }
        }
        Ok(())
    }
}
