//! Per-method translation state: blocks, edges and variables.

use crate::{
    cfg::{
        CfgBlock, Edge, Expression, MethodBody, SourceLocation, Statement, Variable, VariableKind,
        VariableRc,
    },
    error::ErrorSite,
    input::{Body, InstrId, LocalId},
    types::Type,
    utils::graph::{DirectedGraph, NodeId},
    Error, Result,
};

/// The block builder for one method body.
///
/// Owns the graph under construction and the mapping from instructions to the blocks that
/// start at them. The entry block exists from the start and is mapped to the first
/// instruction; the sink is created alongside it and never gets statements.
#[derive(Debug)]
pub struct MethodInfo<'b> {
    body: &'b Body,
    graph: DirectedGraph<CfgBlock, Edge>,
    blocks_by_instr: Vec<Option<NodeId>>,
    block_counter: usize,
    entry: NodeId,
    sink: NodeId,
    return_variable: Option<VariableRc>,
    this_variable: Option<VariableRc>,
    exception_variable: Option<VariableRc>,
    parameters: Vec<VariableRc>,
    locals: Vec<VariableRc>,
    temps: Vec<VariableRc>,
    current: Option<InstrId>,
    uses_monitors: bool,
}

impl<'b> MethodInfo<'b> {
    /// Sets up entry, sink and the method's variables for `body`.
    #[must_use]
    pub fn new(body: &'b Body) -> Self {
        let signature = &body.signature;
        let mut graph = DirectedGraph::with_capacity(body.len() / 2 + 2, body.len() / 2 + 2);
        let entry = graph.add_node(CfgBlock::new("block0"));
        let sink = graph.add_node(CfgBlock::new("sink"));

        let mut blocks_by_instr = vec![None; body.len()];
        if let Some(first) = blocks_by_instr.first_mut() {
            *first = Some(entry);
        }

        let return_variable = (!signature.return_type.is_void())
            .then(|| Variable::new("$ret", signature.return_type.clone(), VariableKind::Return));
        let this_variable = (!body.is_static).then(|| {
            Variable::new(
                "this",
                Type::Class(signature.class.clone()),
                VariableKind::This,
            )
        });
        let parameters = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| Variable::new(format!("$param{i}"), ty.clone(), VariableKind::Parameter(i)))
            .collect();
        let locals = body
            .locals
            .iter()
            .map(|local| Variable::new(local.name.clone(), local.ty.clone(), VariableKind::Local))
            .collect();

        MethodInfo {
            body,
            graph,
            blocks_by_instr,
            block_counter: 1,
            entry,
            sink,
            return_variable,
            this_variable,
            exception_variable: None,
            parameters,
            locals,
            temps: Vec::new(),
            current: None,
            uses_monitors: false,
        }
    }

    /// The body being translated.
    #[must_use]
    pub fn body(&self) -> &'b Body {
        self.body
    }

    /// The entry block.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// The sink block.
    #[must_use]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// The graph built so far.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph<CfgBlock, Edge> {
        &self.graph
    }

    /// The block starting at `instr`, creating it on first request.
    ///
    /// Every call with the same instruction returns the same block. Instructions outside the
    /// stream get a fresh, unmapped block each time; callers validate targets first.
    pub fn lookup_or_create_block(&mut self, instr: InstrId) -> NodeId {
        if let Some(block) = self.find_block(instr) {
            return block;
        }
        let block = self.create_block();
        if let Some(slot) = self.blocks_by_instr.get_mut(instr.index()) {
            *slot = Some(block);
        }
        block
    }

    /// The block starting at `instr`, if one was created.
    #[must_use]
    pub fn find_block(&self, instr: InstrId) -> Option<NodeId> {
        self.blocks_by_instr.get(instr.index()).copied().flatten()
    }

    /// A fresh block not mapped to any instruction.
    pub fn create_block(&mut self) -> NodeId {
        let label = format!("block{}", self.block_counter);
        self.block_counter += 1;
        self.graph.add_node(CfgBlock::new(label))
    }

    /// Adds the edge `from -> to`, guarded by `label` if given.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvariantViolation`] if the edge already exists. Multi-way
    /// branches are lowered before translation, so two edges between the same ordered pair
    /// of blocks indicate an upstream bug.
    pub fn connect(&mut self, from: NodeId, to: NodeId, label: Option<Expression>) -> Result<()> {
        if self.graph.find_edge(from, to).is_some() {
            return Err(invariant_error!(
                self.site(),
                "duplicate edge {} -> {}",
                self.block_label(from),
                self.block_label(to)
            ));
        }

        let edge = match label {
            Some(condition) => Edge::guarded(condition),
            None => Edge::unconditional(),
        };
        self.graph.add_edge(from, to, edge)?;
        Ok(())
    }

    /// Appends `statement` to `block`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if `block` is not a block of this method.
    pub fn push_statement(&mut self, block: NodeId, statement: Statement) -> Result<()> {
        let node_count = self.graph.node_count();
        let target = self.graph.node_mut(block).ok_or_else(|| {
            Error::GraphError(format!(
                "Block {block} does not exist (graph has {node_count} nodes)"
            ))
        })?;
        target.push(statement);
        Ok(())
    }

    fn block_label(&self, block: NodeId) -> &str {
        self.graph.node(block).map_or("?", CfgBlock::label)
    }

    /// Marks `instr` as the instruction under translation, for error reporting.
    pub fn enter(&mut self, instr: InstrId) {
        self.current = Some(instr);
    }

    /// The instruction under translation.
    #[must_use]
    pub fn current_instruction(&self) -> Option<InstrId> {
        self.current
    }

    pub(crate) fn site(&self) -> ErrorSite {
        match self.current {
            Some(id) => ErrorSite {
                instruction: self.body.describe(id),
                location: self
                    .body
                    .instruction(id)
                    .map(|instr| instr.location.clone())
                    .unwrap_or_default(),
            },
            None => ErrorSite::none(),
        }
    }

    /// The distinguished return variable; `None` for void methods.
    #[must_use]
    pub fn return_variable(&self) -> Option<&VariableRc> {
        self.return_variable.as_ref()
    }

    /// The receiver variable; `None` for static methods.
    #[must_use]
    pub fn this_variable(&self) -> Option<&VariableRc> {
        self.this_variable.as_ref()
    }

    /// The variable of parameter `index`.
    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<&VariableRc> {
        self.parameters.get(index)
    }

    /// The variable of a source local.
    #[must_use]
    pub fn local(&self, id: LocalId) -> Option<&VariableRc> {
        self.locals.get(id.index())
    }

    /// The caught-exception variable, created on first use.
    pub fn exception_variable(&mut self, ty: &Type) -> VariableRc {
        self.exception_variable
            .get_or_insert_with(|| Variable::new("$exception", ty.clone(), VariableKind::Exception))
            .clone()
    }

    /// A new temporary named `{prefix}{n}`.
    pub fn fresh_temp(&mut self, prefix: &str, ty: Type) -> VariableRc {
        let var = Variable::new(
            format!("{prefix}{}", self.temps.len()),
            ty,
            VariableKind::Temporary,
        );
        self.temps.push(var.clone());
        var
    }

    /// Records that a monitor region was entered.
    pub fn mark_monitor_use(&mut self) {
        self.uses_monitors = true;
    }

    /// Returns true once a monitor region was entered.
    #[must_use]
    pub fn uses_monitors(&self) -> bool {
        self.uses_monitors
    }

    /// Location of the instruction under translation.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        self.site().location
    }

    /// Completes the method.
    #[must_use]
    pub fn finish(self) -> MethodBody {
        let mut locals = self.locals;
        locals.extend(self.temps);
        locals.extend(self.exception_variable);

        MethodBody {
            graph: self.graph,
            entry: self.entry,
            sink: self.sink,
            return_variable: self.return_variable,
            this_variable: self.this_variable,
            parameters: self.parameters,
            locals,
            is_synchronized: self.body.is_synchronized,
            uses_monitors: self.uses_monitors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::straight_body;

    #[test]
    fn test_lookup_or_create_is_idempotent() {
        let body = straight_body(4);
        let mut info = MethodInfo::new(&body);

        assert_eq!(info.lookup_or_create_block(InstrId::new(0)), info.entry());
        let b2 = info.lookup_or_create_block(InstrId::new(2));
        assert_eq!(info.lookup_or_create_block(InstrId::new(2)), b2);
        assert_eq!(info.find_block(InstrId::new(2)), Some(b2));
        assert_eq!(info.find_block(InstrId::new(1)), None);
        assert_eq!(info.graph().node(b2).map(CfgBlock::label), Some("block1"));
    }

    #[test]
    fn test_duplicate_edge_is_fatal() {
        let body = straight_body(2);
        let mut info = MethodInfo::new(&body);
        let (entry, sink) = (info.entry(), info.sink());

        info.enter(InstrId::new(1));
        info.connect(entry, sink, None).unwrap();
        let err = info.connect(entry, sink, Some(Expression::bool(true)));

        match err {
            Err(Error::InvariantViolation {
                message,
                instruction,
                ..
            }) => {
                assert_eq!(message, "duplicate edge block0 -> sink");
                assert!(instruction.starts_with("#1: "));
            }
            other => panic!("expected invariant violation, got {other:?}"),
        }
        assert_eq!(info.graph().edge_count(), 1);
    }

    #[test]
    fn test_push_statement_to_unknown_block() {
        let body = straight_body(1);
        let mut info = MethodInfo::new(&body);
        let stmt = Statement::assume(SourceLocation::default(), Expression::bool(true));

        assert!(info.push_statement(info.entry(), stmt.clone()).is_ok());
        let missing = NodeId::new(info.graph().node_count() + 3);
        assert!(matches!(
            info.push_statement(missing, stmt),
            Err(Error::GraphError(_))
        ));
        let entry = info.graph().node(info.entry()).map(|b| b.statements().len());
        assert_eq!(entry, Some(1));
    }

    #[test]
    fn test_variables() {
        let body = straight_body(1);
        let mut info = MethodInfo::new(&body);

        assert!(info.return_variable().is_none());
        assert!(info.this_variable().is_none());
        let t0 = info.fresh_temp("$tmp", Type::Int);
        let t1 = info.fresh_temp("$tmp", Type::Int);
        assert_eq!(t0.name(), "$tmp0");
        assert_eq!(t1.name(), "$tmp1");

        let e1 = info.exception_variable(&Type::class("E"));
        let e2 = info.exception_variable(&Type::class("E"));
        assert_eq!(e1, e2);

        let finished = info.finish();
        assert_eq!(finished.locals().len(), body.locals.len() + 3);
    }
}
