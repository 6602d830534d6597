//! Instruction-by-instruction translation of one method body.
//!
//! # Block Discovery
//!
//! Blocks are discovered in a single forward pass. Before each instruction, `precheck`
//! decides which block it belongs to:
//!
//! 1. With no open block (control just terminated), the instruction's block is looked up or
//!    created and opened.
//! 2. If the instruction already starts a different block (it was the target of an earlier
//!    jump), the open block falls through to it.
//! 3. If the instruction is a join point (more than one predecessor according to the
//!    [`PredecessorOracle`]), a new block is started and the open block falls through to it.
//! 4. Otherwise the instruction extends the open block.
//!
//! Jumps and branches look up or create the blocks of their targets and close the open block.
//! Returns connect to the method's sink.

use crate::{
    cfg::{CallTarget, Expression, SourceLocation, Statement},
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    input::{
        Body, Constant, InstrId, Instruction, InstructionKind, InvokeExpr, InvokeKind,
        PredecessorOracle, Value,
    },
    program::Program,
    translator::{CallSite, IdiomKind, MethodInfo},
    utils::graph::NodeId,
    Error, Result,
};

/// Translates one body into a [`crate::cfg::MethodBody`].
pub(crate) struct StmtTranslator<'p, 'b> {
    pub(crate) program: &'p Program,
    pub(crate) info: MethodInfo<'b>,
    oracle: &'p dyn PredecessorOracle,
    current: Option<NodeId>,
    pub(crate) location: SourceLocation,
    inside_monitor: bool,
    signature: String,
}

impl<'p, 'b> StmtTranslator<'p, 'b> {
    pub(crate) fn new(
        program: &'p Program,
        body: &'b Body,
        oracle: &'p dyn PredecessorOracle,
    ) -> Self {
        StmtTranslator {
            program,
            info: MethodInfo::new(body),
            oracle,
            current: None,
            location: SourceLocation::default(),
            inside_monitor: false,
            signature: body.signature.signature(),
        }
    }

    /// Runs the pass and returns the completed block builder.
    pub(crate) fn run(mut self) -> Result<MethodInfo<'b>> {
        let body = self.info.body();
        for (id, instr) in body.iter() {
            self.precheck(id, instr)?;
            self.translate_instruction(id, instr)?;
        }

        if body.is_empty() {
            let (entry, sink) = (self.info.entry(), self.info.sink());
            self.info.connect(entry, sink, None)?;
        } else if let Some(open) = self.current.take() {
            let sink = self.info.sink();
            self.info.connect(open, sink, None)?;
        }

        Ok(self.info)
    }

    /// Returns true if the method is synchronized or a monitor region is open.
    pub(crate) fn is_synchronized_or_inside_monitor(&self) -> bool {
        self.inside_monitor || self.info.body().is_synchronized
    }

    fn precheck(&mut self, id: InstrId, instr: &Instruction) -> Result<()> {
        self.info.enter(id);
        self.location = instr.location.clone();

        match self.current {
            None => {
                self.current = Some(self.info.lookup_or_create_block(id));
            }
            Some(open) => {
                if let Some(block) = self.info.find_block(id) {
                    if block != open {
                        self.info.connect(open, block, None)?;
                        self.current = Some(block);
                    }
                } else if self.oracle.predecessor_count(id) > 1 {
                    let block = self.info.lookup_or_create_block(id);
                    self.info.connect(open, block, None)?;
                    self.current = Some(block);
                }
            }
        }
        Ok(())
    }

    /// The open block. After `precheck` there always is one while an instruction is
    /// translated; `None` only after a terminator.
    pub(crate) fn current_block(&self) -> Result<NodeId> {
        self.current
            .ok_or_else(|| invariant_error!(self.info.site(), "no open block"))
    }

    pub(crate) fn emit(&mut self, statement: Statement) -> Result<()> {
        let block = self.current_block()?;
        self.info.push_statement(block, statement)
    }

    fn diagnostic(&self, severity: DiagnosticSeverity, category: DiagnosticCategory, msg: String) {
        self.program.diagnostics().push(
            Diagnostic::new(severity, category, msg)
                .with_method(self.signature.clone())
                .with_location(self.location.clone()),
        );
    }

    fn check_target(&self, target: InstrId) -> Result<()> {
        if target.index() >= self.info.body().len() {
            return Err(structural_error!(
                self.info.site(),
                "jump target {} is outside the instruction stream",
                target
            ));
        }
        Ok(())
    }

    fn translate_instruction(&mut self, id: InstrId, instr: &Instruction) -> Result<()> {
        match &instr.kind {
            InstructionKind::Assign { lhs, rhs } => self.translate_assign(lhs, rhs),
            InstructionKind::Identity { local, rhs } => self.translate_identity(*local, rhs),
            InstructionKind::Goto(target) => self.translate_goto(*target),
            InstructionKind::If { condition, target } => self.translate_if(id, condition, *target),
            InstructionKind::Invoke(expr) => self.translate_invoke(expr, None),
            InstructionKind::Return(value) => self.translate_return(value),
            InstructionKind::ReturnVoid => self.translate_return_void(),
            InstructionKind::EnterMonitor(value) => self.translate_monitor(value, true),
            InstructionKind::ExitMonitor(value) => self.translate_monitor(value, false),
            InstructionKind::Nop | InstructionKind::Breakpoint => Ok(()),
            InstructionKind::TableSwitch { .. } | InstructionKind::LookupSwitch { .. } => Err(
                structural_error!(self.info.site(), "switch must be lowered to binary branches"),
            ),
            InstructionKind::Ret(_) => Err(structural_error!(
                self.info.site(),
                "subroutine return must be inlined"
            )),
            InstructionKind::Throw(_) => Err(structural_error!(
                self.info.site(),
                "throw must be replaced by explicit control flow"
            )),
        }
    }

    fn translate_goto(&mut self, target: InstrId) -> Result<()> {
        self.check_target(target)?;
        let open = self.current_block()?;
        let block = self.info.lookup_or_create_block(target);
        self.info.connect(open, block, None)?;
        self.current = None;
        Ok(())
    }

    /// The condition is translated once; the negated guard is `!` over a deep copy of it.
    fn translate_if(&mut self, id: InstrId, condition: &Value, target: InstrId) -> Result<()> {
        self.check_target(target)?;
        let condition = self.translate_value(condition)?;

        let next = self.info.body().fallthrough(id);
        if next == Some(target) {
            // Both outcomes continue at the same instruction.
            return Ok(());
        }

        let negated = Expression::lnot(condition.deep_copy());
        let open = self.current_block()?;
        let then_block = self.info.lookup_or_create_block(target);
        self.info.connect(open, then_block, Some(condition))?;

        match next {
            Some(next) => {
                let else_block = self.info.lookup_or_create_block(next);
                self.info.connect(open, else_block, Some(negated))?;
                self.current = Some(else_block);
            }
            None => {
                let sink = self.info.sink();
                self.info.connect(open, sink, Some(negated))?;
                self.current = None;
            }
        }
        Ok(())
    }

    pub(crate) fn translate_return(&mut self, value: &Value) -> Result<()> {
        let Some(ret) = self.info.return_variable().cloned() else {
            return Err(invariant_error!(
                self.info.site(),
                "return with a value in a void method"
            ));
        };
        let value = self.translate_value(value)?;
        self.emit(Statement::assign(
            self.location.clone(),
            Expression::var(&ret),
            value,
        ))?;
        self.translate_return_void()
    }

    pub(crate) fn translate_return_void(&mut self) -> Result<()> {
        let open = self.current_block()?;
        let sink = self.info.sink();
        self.info.connect(open, sink, None)?;
        self.current = None;
        Ok(())
    }

    fn translate_monitor(&mut self, lock: &Value, enter: bool) -> Result<()> {
        // Evaluated for its reads only; the monitor itself has no statement.
        self.translate_value(lock)?;
        self.inside_monitor = enter;
        self.info.mark_monitor_use();
        self.diagnostic(
            DiagnosticSeverity::Info,
            DiagnosticCategory::Monitor,
            format!(
                "{} {lock}: synchronization not modelled",
                if enter { "entermonitor" } else { "exitmonitor" }
            ),
        );
        Ok(())
    }

    /// Translates a call, storing its result into `dest` if given.
    pub(crate) fn translate_invoke(
        &mut self,
        expr: &InvokeExpr,
        dest: Option<Expression>,
    ) -> Result<()> {
        if expr.kind == InvokeKind::Dynamic {
            return self.translate_dynamic(expr, dest);
        }

        let site = CallSite::new(&expr.method, dest.is_some());
        match self.program.idioms().lookup(&site) {
            Some(kind) => self.lower_idiom(kind, expr, dest),
            None => self.translate_call(expr, dest),
        }
    }

    fn call_arguments(&mut self, expr: &InvokeExpr) -> Result<Vec<Expression>> {
        let mut args = expr
            .args
            .iter()
            .map(|arg| self.translate_value(arg))
            .collect::<Result<Vec<_>>>()?;

        if expr.kind.has_receiver() {
            let base = self.call_base(expr)?;
            args.insert(0, base);
        }
        Ok(args)
    }

    fn call_base(&mut self, expr: &InvokeExpr) -> Result<Expression> {
        match &expr.base {
            Some(base) => self.translate_value(base),
            None => Err(invariant_error!(
                self.info.site(),
                "{} call without receiver",
                expr.kind
            )),
        }
    }

    fn single_argument(&mut self, expr: &InvokeExpr) -> Result<Expression> {
        match expr.args.as_slice() {
            [arg] => self.translate_value(arg),
            args => Err(invariant_error!(
                self.info.site(),
                "{} expects one argument, got {}",
                expr.method,
                args.len()
            )),
        }
    }

    fn translate_call(&mut self, expr: &InvokeExpr, dest: Option<Expression>) -> Result<()> {
        let args = self.call_arguments(expr)?;
        let method = self.program.resolve_method(&expr.method);
        self.emit(Statement::call(
            self.location.clone(),
            CallTarget::resolved(&method),
            args,
            dest,
        ))
    }

    fn translate_dynamic(&mut self, expr: &InvokeExpr, dest: Option<Expression>) -> Result<()> {
        let signature = expr.method.signature();
        if self.program.config().strict_unsupported {
            let site = self.info.site();
            return Err(Error::Unsupported {
                message: format!("indirect invocation of {signature}"),
                instruction: site.instruction,
                location: site.location,
            });
        }

        self.diagnostic(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::Call,
            format!("unsound: indirect invocation of {signature} treated as opaque call"),
        );
        let mut args = expr
            .args
            .iter()
            .map(|arg| self.translate_value(arg))
            .collect::<Result<Vec<_>>>()?;
        if let Some(base) = &expr.base {
            args.insert(0, self.translate_value(base)?);
        }
        self.emit(Statement::call(
            self.location.clone(),
            CallTarget::Opaque(signature.into()),
            args,
            dest,
        ))
    }

    fn lower_idiom(
        &mut self,
        kind: IdiomKind,
        expr: &InvokeExpr,
        dest: Option<Expression>,
    ) -> Result<()> {
        let location = self.location.clone();
        match kind {
            IdiomKind::Assert | IdiomKind::Precondition => {
                if dest.is_some() {
                    return Err(invariant_error!(
                        self.info.site(),
                        "result of {} is used",
                        expr.method
                    ));
                }
                let condition = self.single_argument(expr)?;
                self.emit(Statement::assert(location, condition))
            }
            IdiomKind::StringLength => {
                let Some(dest) = dest else {
                    return Ok(());
                };
                let base = self.call_base(expr)?;
                let length = self.program.memory_model().string_length(self.program, base)?;
                self.emit(Statement::assign(location, dest, length))
            }
            IdiomKind::Exit => {
                self.diagnostic(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::Control,
                    format!("{} ends the path", expr.method),
                );
                self.current = None;
                Ok(())
            }
            IdiomKind::TestFailure => {
                let return_type = self.info.body().signature.return_type.clone();
                match Constant::default_for(&return_type) {
                    Some(default) => self.translate_return(&Value::Constant(default)),
                    None => self.translate_return_void(),
                }
            }
            IdiomKind::IsAssignableFrom => {
                let (base, arg) = (self.call_base(expr)?, self.single_argument(expr)?);
                self.assign_result(dest, Expression::po_leq(arg, base))
            }
            IdiomKind::GetClass => {
                let base = self.call_base(expr)?;
                let tag = self.read_type_tag(base)?;
                self.assign_result(dest, tag)
            }
            IdiomKind::Cast => {
                let (base, arg) = (self.call_base(expr)?, self.single_argument(expr)?);
                let tag = self.read_type_tag(arg.deep_copy())?;
                self.emit(Statement::assert(location, Expression::po_leq(tag, base)))?;
                self.assign_result(dest, arg)
            }
            IdiomKind::IsInstance => {
                let (base, arg) = (self.call_base(expr)?, self.single_argument(expr)?);
                let tag = self.read_type_tag(arg)?;
                self.assign_result(dest, Expression::po_leq(tag, base))
            }
        }
    }

    fn assign_result(&mut self, dest: Option<Expression>, value: Expression) -> Result<()> {
        match dest {
            Some(dest) => self.emit(Statement::assign(self.location.clone(), dest, value)),
            None => Err(invariant_error!(
                self.info.site(),
                "type query lowered without a result"
            )),
        }
    }
}
