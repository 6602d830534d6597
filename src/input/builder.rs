//! Label-based construction of [`Body`] values.
//!
//! Jump targets are named labels while building and resolved to [`InstrId`]s by
//! [`BodyBuilder::finish`], so forward jumps need no placeholders.
//!
//! # Example
//!
//! ```rust
//! use cfglift::prelude::*;
//!
//! let mut b = BodyBuilder::new(MethodRef::new("A", "abs", vec![Type::Int], Type::Int));
//! let x = b.param("x", 0, Type::Int);
//! b.if_goto(Value::binary(BinaryOp::Ge, x.into(), Value::int(0)), "done");
//! b.assign(x, Value::binary(BinaryOp::Sub, Value::int(0), x.into()));
//! b.label("done")?;
//! b.ret(x);
//! let body = b.finish()?;
//! assert_eq!(body.len(), 4);
//! # Ok::<(), cfglift::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    cfg::SourceLocation,
    input::{Body, InstrId, Instruction, InstructionKind, InvokeExpr, Local, LocalId, Value},
    types::{MethodRef, Type},
    Error, Result,
};

/// A jump operand waiting for its label.
#[derive(Debug)]
struct LabelFixup {
    instruction: InstrId,
    /// Index into the switch's target list; `None` for the single target of goto/if
    /// and for a switch default.
    slot: Option<usize>,
    label: String,
}

/// Incrementally builds a [`Body`].
#[derive(Debug)]
pub struct BodyBuilder {
    body: Body,
    labels: HashMap<String, usize>,
    fixups: Vec<LabelFixup>,
    location: SourceLocation,
}

impl BodyBuilder {
    /// Starts a static, unsynchronized body for `signature`.
    #[must_use]
    pub fn new(signature: MethodRef) -> Self {
        BodyBuilder {
            body: Body::new(signature, true),
            labels: HashMap::new(),
            fixups: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    /// Sets whether the method is static.
    pub fn set_static(&mut self, is_static: bool) -> &mut Self {
        self.body.is_static = is_static;
        self
    }

    /// Sets whether the method is declared synchronized.
    pub fn synchronized(&mut self, is_synchronized: bool) -> &mut Self {
        self.body.is_synchronized = is_synchronized;
        self
    }

    /// Location attached to subsequently pushed instructions.
    pub fn at(&mut self, location: SourceLocation) -> &mut Self {
        self.location = location;
        self
    }

    /// Keeps the current file and moves to `line`.
    pub fn at_line(&mut self, line: u32) -> &mut Self {
        self.location.line = Some(line);
        self
    }

    /// Declares a local.
    pub fn local(&mut self, name: impl Into<String>, ty: Type) -> LocalId {
        let id = LocalId::new(self.body.locals.len());
        self.body.locals.push(Local {
            name: name.into(),
            ty,
        });
        id
    }

    /// Declares a local and binds it to parameter `index`.
    pub fn param(&mut self, name: impl Into<String>, index: usize, ty: Type) -> LocalId {
        let local = self.local(name, ty.clone());
        self.identity(local, Value::Parameter { index, ty });
        local
    }

    /// Declares a local bound to the receiver and marks the method as non-static.
    pub fn this(&mut self, ty: Type) -> LocalId {
        self.body.is_static = false;
        let local = self.local("this", ty.clone());
        self.identity(local, Value::This(ty));
        local
    }

    /// Binds `name` to the position of the next instruction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] if `name` is already bound.
    pub fn label(&mut self, name: &str) -> Result<()> {
        if self.labels.contains_key(name) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        self.labels.insert(name.to_string(), self.body.instructions.len());
        Ok(())
    }

    /// Appends a raw instruction; jump targets in `kind` are taken as-is.
    pub fn push(&mut self, kind: InstructionKind) -> InstrId {
        let id = InstrId::new(self.body.instructions.len());
        self.body
            .instructions
            .push(Instruction::new(kind, self.location.clone()));
        id
    }

    /// `lhs = rhs`
    pub fn assign(&mut self, lhs: impl Into<Value>, rhs: impl Into<Value>) -> InstrId {
        self.push(InstructionKind::Assign {
            lhs: lhs.into(),
            rhs: rhs.into(),
        })
    }

    /// `local := rhs` for parameter, receiver and caught-exception references.
    pub fn identity(&mut self, local: LocalId, rhs: Value) -> InstrId {
        self.push(InstructionKind::Identity { local, rhs })
    }

    /// A call whose result is discarded.
    pub fn invoke(&mut self, expr: InvokeExpr) -> InstrId {
        self.push(InstructionKind::Invoke(expr))
    }

    /// `goto label`
    pub fn goto(&mut self, label: &str) -> InstrId {
        let id = self.push(InstructionKind::Goto(InstrId::new(0)));
        self.fixup(id, None, label);
        id
    }

    /// `if condition goto label`
    pub fn if_goto(&mut self, condition: Value, label: &str) -> InstrId {
        let id = self.push(InstructionKind::If {
            condition,
            target: InstrId::new(0),
        });
        self.fixup(id, None, label);
        id
    }

    /// `lookupswitch(key) { case k: goto label; ... default: goto default }`
    pub fn lookup_switch(&mut self, key: Value, cases: &[(i32, &str)], default: &str) -> InstrId {
        let id = self.push(InstructionKind::LookupSwitch {
            key,
            cases: cases.iter().map(|(k, _)| (*k, InstrId::new(0))).collect(),
            default: InstrId::new(0),
        });
        for (slot, (_, label)) in cases.iter().enumerate() {
            self.fixup(id, Some(slot), label);
        }
        self.fixup(id, None, default);
        id
    }

    /// `return value`
    pub fn ret(&mut self, value: impl Into<Value>) -> InstrId {
        self.push(InstructionKind::Return(value.into()))
    }

    /// `return`
    pub fn ret_void(&mut self) -> InstrId {
        self.push(InstructionKind::ReturnVoid)
    }

    /// `entermonitor value`
    pub fn enter_monitor(&mut self, value: impl Into<Value>) -> InstrId {
        self.push(InstructionKind::EnterMonitor(value.into()))
    }

    /// `exitmonitor value`
    pub fn exit_monitor(&mut self, value: impl Into<Value>) -> InstrId {
        self.push(InstructionKind::ExitMonitor(value.into()))
    }

    /// `nop`
    pub fn nop(&mut self) -> InstrId {
        self.push(InstructionKind::Nop)
    }

    fn fixup(&mut self, instruction: InstrId, slot: Option<usize>, label: &str) {
        self.fixups.push(LabelFixup {
            instruction,
            slot,
            label: label.to_string(),
        });
    }

    /// Resolves all labels and returns the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedLabel`] if a jump names a label that was never bound, or
    /// one bound after the last instruction.
    pub fn finish(mut self) -> Result<Body> {
        let len = self.body.instructions.len();
        let fixups = std::mem::take(&mut self.fixups);

        for fixup in &fixups {
            let position = self
                .labels
                .get(&fixup.label)
                .copied()
                .filter(|&position| position < len)
                .ok_or_else(|| Error::UndefinedLabel(fixup.label.clone()))?;
            let target = InstrId::new(position);

            let Some(instruction) = self.body.instructions.get_mut(fixup.instruction.index())
            else {
                continue;
            };
            match (&mut instruction.kind, fixup.slot) {
                (InstructionKind::Goto(t), None)
                | (InstructionKind::If { target: t, .. }, None)
                | (InstructionKind::LookupSwitch { default: t, .. }, None) => *t = target,
                (InstructionKind::LookupSwitch { cases, .. }, Some(slot)) => {
                    if let Some(case) = cases.get_mut(slot) {
                        case.1 = target;
                    }
                }
                _ => {}
            }
        }

        Ok(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> BodyBuilder {
        BodyBuilder::new(MethodRef::new("A", "f", vec![], Type::Void))
    }

    #[test]
    fn test_forward_and_backward_labels() {
        let mut b = builder();
        b.label("top").unwrap();
        b.nop();
        b.if_goto(Value::int(1), "end");
        b.goto("top");
        b.label("end").unwrap();
        b.ret_void();
        let body = b.finish().unwrap();

        assert_eq!(
            body.instructions[1].kind.jump_targets(),
            vec![InstrId::new(3)]
        );
        assert_eq!(body.instructions[2].kind, InstructionKind::Goto(InstrId::new(0)));
    }

    #[test]
    fn test_duplicate_label() {
        let mut b = builder();
        b.label("x").unwrap();
        assert!(matches!(b.label("x"), Err(Error::DuplicateLabel(name)) if name == "x"));
    }

    #[test]
    fn test_undefined_label() {
        let mut b = builder();
        b.goto("nowhere");
        assert!(matches!(b.finish(), Err(Error::UndefinedLabel(name)) if name == "nowhere"));
    }

    #[test]
    fn test_label_past_end() {
        let mut b = builder();
        b.goto("end");
        b.label("end").unwrap();
        assert!(matches!(b.finish(), Err(Error::UndefinedLabel(_))));
    }

    #[test]
    fn test_switch_targets() {
        let mut b = builder();
        b.lookup_switch(Value::int(0), &[(1, "a"), (5, "b")], "a");
        b.label("a").unwrap();
        b.nop();
        b.label("b").unwrap();
        b.ret_void();
        let body = b.finish().unwrap();

        assert_eq!(
            body.instructions[0].kind.jump_targets(),
            vec![InstrId::new(1), InstrId::new(2), InstrId::new(1)]
        );
    }

    #[test]
    fn test_params_and_locations() {
        let mut b = builder();
        b.at(SourceLocation::new("A.java", 3));
        b.this(Type::class("A"));
        b.at_line(4);
        let p = b.param("p", 0, Type::Int);
        b.ret_void();
        let body = b.finish().unwrap();

        assert!(!body.is_static);
        assert_eq!(p, LocalId::new(1));
        assert_eq!(body.locals.len(), 2);
        assert_eq!(body.instructions[0].location.line, Some(3));
        assert_eq!(body.instructions[1].location.to_string(), "A.java:4");
    }
}
