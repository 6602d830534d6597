//! A method body as delivered by the front-end.

use crate::{
    cfg::{BinaryOp, UnaryOp},
    input::{Constant, InstrId, Instruction, LocalId, Value},
    types::{MethodRef, Type},
};

/// A declared local of a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    /// Name, for display
    pub name: String,
    /// Declared type
    pub ty: Type,
}

/// One method's instruction stream plus what is needed to interpret it.
///
/// Instructions are identified by position; jump targets are [`InstrId`]s into
/// [`Body::instructions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// The method this body implements
    pub signature: MethodRef,
    /// Static methods have no receiver
    pub is_static: bool,
    /// Declared `synchronized`
    pub is_synchronized: bool,
    /// Locals, indexed by [`LocalId`]
    pub locals: Vec<Local>,
    /// The instruction stream
    pub instructions: Vec<Instruction>,
}

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub fn new(signature: MethodRef, is_static: bool) -> Self {
        Body {
            signature,
            is_static,
            is_synchronized: false,
            locals: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the stream has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the instruction at `id`.
    #[must_use]
    pub fn instruction(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions.get(id.index())
    }

    /// Iterates over the stream with instruction ids.
    pub fn iter(&self) -> impl Iterator<Item = (InstrId, &Instruction)> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, instr)| (InstrId::new(i), instr))
    }

    /// Returns the local at `id`.
    #[must_use]
    pub fn local(&self, id: LocalId) -> Option<&Local> {
        self.locals.get(id.index())
    }

    /// The instruction following `id` in the stream, if any.
    #[must_use]
    pub fn fallthrough(&self, id: InstrId) -> Option<InstrId> {
        let next = id.next();
        (next.index() < self.instructions.len()).then_some(next)
    }

    /// `#<index>: <text>` for error messages.
    #[must_use]
    pub fn describe(&self, id: InstrId) -> String {
        match self.instruction(id) {
            Some(instr) => format!("{id}: {instr}"),
            None => format!("{id}: <out of range>"),
        }
    }

    /// Static type of `value`, as far as the body's declarations determine it.
    ///
    /// Returns `None` for references to undeclared locals and for array operations on
    /// non-array operands.
    #[must_use]
    pub fn type_of(&self, value: &Value) -> Option<Type> {
        match value {
            Value::Local(id) => self.local(*id).map(|l| l.ty.clone()),
            Value::Constant(constant) => Some(match constant {
                Constant::Int(_) => Type::Int,
                Constant::Long(_) => Type::Long,
                Constant::Float(_) => Type::Float,
                Constant::Double(_) => Type::Double,
                Constant::Boolean(_) => Type::Boolean,
                Constant::Null => Type::Null,
                Constant::String(_) => Type::class("java.lang.String"),
                Constant::Class(_) => Type::class("java.lang.Class"),
            }),
            Value::Unary { op, operand } => match op {
                UnaryOp::LNot => Some(Type::Boolean),
                UnaryOp::Neg => self.type_of(operand),
            },
            Value::Binary { op, left, .. } => match op {
                BinaryOp::Cmp | BinaryOp::Cmpl | BinaryOp::Cmpg => Some(Type::Int),
                op if op.is_predicate() => Some(Type::Boolean),
                _ => self.type_of(left),
            },
            Value::Cast { ty, .. } | Value::New(ty) | Value::NewMultiArray { ty, .. } => {
                Some(ty.clone())
            }
            Value::InstanceOf { .. } => Some(Type::Boolean),
            Value::Length(_) => Some(Type::Int),
            Value::NewArray { element, .. } => Some(Type::array_of(element.clone())),
            Value::InstanceField { field, .. } | Value::StaticField(field) => {
                Some(field.ty.clone())
            }
            Value::ArrayElement { base, .. } => {
                self.type_of(base).and_then(|t| t.element_type().cloned())
            }
            Value::Invoke(expr) => Some(expr.method.return_type.clone()),
            Value::Parameter { ty, .. } | Value::This(ty) | Value::CaughtException(ty) => {
                Some(ty.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cfg::SourceLocation, input::InstructionKind, types::FieldRef};

    fn sample_body() -> Body {
        let mut body = Body::new(MethodRef::new("A", "f", vec![], Type::Void), true);
        body.locals.push(Local {
            name: "arr".to_string(),
            ty: Type::array_of(Type::Long),
        });
        body.instructions.push(Instruction::new(
            InstructionKind::Nop,
            SourceLocation::line(1),
        ));
        body.instructions.push(Instruction::new(
            InstructionKind::ReturnVoid,
            SourceLocation::line(2),
        ));
        body
    }

    #[test]
    fn test_navigation() {
        let body = sample_body();
        assert_eq!(body.len(), 2);
        assert_eq!(body.fallthrough(InstrId::new(0)), Some(InstrId::new(1)));
        assert_eq!(body.fallthrough(InstrId::new(1)), None);
        assert_eq!(body.describe(InstrId::new(1)), "#1: return");
        assert_eq!(body.describe(InstrId::new(5)), "#5: <out of range>");
    }

    #[test]
    fn test_type_of() {
        let body = sample_body();
        let arr = Value::local(LocalId::new(0));

        assert_eq!(
            body.type_of(&Value::element(arr.clone(), Value::int(0))),
            Some(Type::Long)
        );
        assert_eq!(body.type_of(&Value::length(arr.clone())), Some(Type::Int));
        assert_eq!(
            body.type_of(&Value::binary(BinaryOp::Lt, Value::int(1), Value::int(2))),
            Some(Type::Boolean)
        );
        assert_eq!(
            body.type_of(&Value::field(arr, FieldRef::new("A", "g", Type::Char))),
            Some(Type::Char)
        );
        assert_eq!(body.type_of(&Value::local(LocalId::new(3))), None);
        assert_eq!(
            body.type_of(&Value::element(Value::int(0), Value::int(0))),
            None
        );
    }
}
