//! Operand trees of the instruction stream.

use std::{fmt, sync::Arc};

use strum::Display;

use crate::{
    cfg::{BinaryOp, UnaryOp},
    types::{FieldRef, MethodRef, Type},
};

/// Index of a local in [`Body::locals`](crate::input::Body::locals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(pub(crate) usize);

impl LocalId {
    /// Creates a `LocalId` from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        LocalId(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// Constants of the instruction stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// 32-bit integer (also booleans, chars, shorts and bytes after normalization)
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Boolean
    Boolean(bool),
    /// The null reference
    Null,
    /// String literal
    String(Arc<str>),
    /// Class literal
    Class(Type),
}

impl Constant {
    /// The zero value of `ty`: `0`, `false` or `null`. `None` for void.
    #[must_use]
    pub fn default_for(ty: &Type) -> Option<Constant> {
        match ty {
            Type::Void => None,
            Type::Boolean => Some(Constant::Boolean(false)),
            Type::Byte | Type::Char | Type::Short | Type::Int => Some(Constant::Int(0)),
            Type::Long => Some(Constant::Long(0)),
            Type::Float => Some(Constant::Float(0.0)),
            Type::Double => Some(Constant::Double(0.0)),
            Type::Null | Type::Class(_) | Type::Array(_) | Type::Map { .. } => {
                Some(Constant::Null)
            }
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Long(value) => write!(f, "{value}L"),
            Constant::Float(value) => write!(f, "{value:?}F"),
            Constant::Double(value) => write!(f, "{value:?}"),
            Constant::Boolean(value) => write!(f, "{value}"),
            Constant::Null => write!(f, "null"),
            Constant::String(value) => write!(f, "{value:?}"),
            Constant::Class(ty) => write!(f, "class {ty}"),
        }
    }
}

/// How a call site dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InvokeKind {
    /// No receiver
    #[strum(to_string = "staticinvoke")]
    Static,
    /// Class method through a receiver
    #[strum(to_string = "virtualinvoke")]
    Virtual,
    /// Constructor, private or super call through a receiver
    #[strum(to_string = "specialinvoke")]
    Special,
    /// Interface method through a receiver
    #[strum(to_string = "interfaceinvoke")]
    Interface,
    /// Indirect call site resolved at runtime
    #[strum(to_string = "dynamicinvoke")]
    Dynamic,
}

impl InvokeKind {
    /// Returns true for the kinds that pass a receiver object.
    #[must_use]
    pub fn has_receiver(self) -> bool {
        matches!(
            self,
            InvokeKind::Virtual | InvokeKind::Special | InvokeKind::Interface
        )
    }
}

/// A call site.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    /// Dispatch kind
    pub kind: InvokeKind,
    /// Resolved callee (for [`InvokeKind::Dynamic`] only the call site's descriptor)
    pub method: MethodRef,
    /// Receiver object, present iff [`InvokeKind::has_receiver`]
    pub base: Option<Value>,
    /// Arguments in source order
    pub args: Vec<Value>,
}

impl InvokeExpr {
    /// A static call.
    #[must_use]
    pub fn new_static(method: MethodRef, args: Vec<Value>) -> Self {
        InvokeExpr {
            kind: InvokeKind::Static,
            method,
            base: None,
            args,
        }
    }

    /// A virtual call on `base`.
    #[must_use]
    pub fn new_virtual(method: MethodRef, base: Value, args: Vec<Value>) -> Self {
        InvokeExpr {
            kind: InvokeKind::Virtual,
            method,
            base: Some(base),
            args,
        }
    }

    /// A call with an explicit kind.
    #[must_use]
    pub fn new(kind: InvokeKind, method: MethodRef, base: Option<Value>, args: Vec<Value>) -> Self {
        InvokeExpr {
            kind,
            method,
            base,
            args,
        }
    }
}

impl fmt::Display for InvokeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        if let Some(base) = &self.base {
            write!(f, "{base}.")?;
        }
        write!(f, "{}(", self.method)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// An operand tree.
///
/// After normalization most operands are locals or constants; compound values appear only
/// as the right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A local variable
    Local(LocalId),
    /// A constant
    Constant(Constant),
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Value>,
    },
    /// `left op right`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Value>,
        /// Right operand
        right: Box<Value>,
    },
    /// `(ty) operand`
    Cast {
        /// Target type
        ty: Type,
        /// Operand
        operand: Box<Value>,
    },
    /// `operand instanceof ty`
    InstanceOf {
        /// Tested type
        ty: Type,
        /// Operand
        operand: Box<Value>,
    },
    /// `lengthof array`
    Length(Box<Value>),
    /// `new ty`
    New(Type),
    /// `newarray (element)[size]`
    NewArray {
        /// Element type
        element: Type,
        /// Requested length
        size: Box<Value>,
    },
    /// `newmultiarray ty[sizes]...`
    NewMultiArray {
        /// The allocated array type
        ty: Type,
        /// Lengths of the leading dimensions
        sizes: Vec<Value>,
    },
    /// `base.field`
    InstanceField {
        /// Object holding the field
        base: Box<Value>,
        /// Resolved field
        field: FieldRef,
    },
    /// `Class.field`
    StaticField(FieldRef),
    /// `base[index]`
    ArrayElement {
        /// The array
        base: Box<Value>,
        /// Element index
        index: Box<Value>,
    },
    /// A call producing a value
    Invoke(Box<InvokeExpr>),
    /// `@parameterN: ty`
    Parameter {
        /// Parameter position
        index: usize,
        /// Declared type
        ty: Type,
    },
    /// `@this: ty`
    This(Type),
    /// `@caughtexception`
    CaughtException(Type),
}

impl Value {
    /// `Local(id)`
    #[must_use]
    pub fn local(id: LocalId) -> Self {
        Value::Local(id)
    }

    /// An `int` constant.
    #[must_use]
    pub fn int(value: i32) -> Self {
        Value::Constant(Constant::Int(value))
    }

    /// The `null` constant.
    #[must_use]
    pub fn null() -> Self {
        Value::Constant(Constant::Null)
    }

    /// `left op right`
    #[must_use]
    pub fn binary(op: BinaryOp, left: Value, right: Value) -> Self {
        Value::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `base.field`
    #[must_use]
    pub fn field(base: Value, field: FieldRef) -> Self {
        Value::InstanceField {
            base: Box::new(base),
            field,
        }
    }

    /// `base[index]`
    #[must_use]
    pub fn element(base: Value, index: Value) -> Self {
        Value::ArrayElement {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// `newarray (element)[size]`
    #[must_use]
    pub fn new_array(element: Type, size: Value) -> Self {
        Value::NewArray {
            element,
            size: Box::new(size),
        }
    }

    /// `lengthof array`
    #[must_use]
    pub fn length(array: Value) -> Self {
        Value::Length(Box::new(array))
    }

    /// A call producing a value.
    #[must_use]
    pub fn invoke(expr: InvokeExpr) -> Self {
        Value::Invoke(Box::new(expr))
    }

    /// Returns true for instance field, static field and array element references.
    #[must_use]
    pub fn is_heap_location(&self) -> bool {
        matches!(
            self,
            Value::InstanceField { .. } | Value::StaticField(_) | Value::ArrayElement { .. }
        )
    }

    /// Returns true for the three allocation forms.
    #[must_use]
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            Value::New(_) | Value::NewArray { .. } | Value::NewMultiArray { .. }
        )
    }
}

impl From<LocalId> for Value {
    fn from(id: LocalId) -> Self {
        Value::Local(id)
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Value::Constant(constant)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local(id) => write!(f, "{id}"),
            Value::Constant(constant) => write!(f, "{constant}"),
            Value::Unary { op, operand } => write!(f, "{op}{operand}"),
            Value::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Value::Cast { ty, operand } => write!(f, "({ty}) {operand}"),
            Value::InstanceOf { ty, operand } => write!(f, "{operand} instanceof {ty}"),
            Value::Length(array) => write!(f, "lengthof {array}"),
            Value::New(ty) => write!(f, "new {ty}"),
            Value::NewArray { element, size } => write!(f, "newarray ({element})[{size}]"),
            Value::NewMultiArray { ty, sizes } => {
                write!(f, "newmultiarray ({ty})")?;
                for size in sizes {
                    write!(f, "[{size}]")?;
                }
                Ok(())
            }
            Value::InstanceField { base, field } => write!(f, "{base}.{field}"),
            Value::StaticField(field) => write!(f, "{field}"),
            Value::ArrayElement { base, index } => write!(f, "{base}[{index}]"),
            Value::Invoke(expr) => write!(f, "{expr}"),
            Value::Parameter { index, ty } => write!(f, "@parameter{index}: {ty}"),
            Value::This(ty) => write!(f, "@this: {ty}"),
            Value::CaughtException(_) => write!(f, "@caughtexception"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(Constant::default_for(&Type::Void), None);
        assert_eq!(
            Constant::default_for(&Type::Boolean),
            Some(Constant::Boolean(false))
        );
        assert_eq!(Constant::default_for(&Type::Char), Some(Constant::Int(0)));
        assert_eq!(Constant::default_for(&Type::Long), Some(Constant::Long(0)));
        assert_eq!(
            Constant::default_for(&Type::class("A")),
            Some(Constant::Null)
        );
    }

    #[test]
    fn test_value_display() {
        let length = MethodRef::new("java.lang.String", "length", vec![], Type::Int);
        let call = Value::invoke(InvokeExpr::new_virtual(
            length,
            Value::local(LocalId::new(0)),
            vec![],
        ));
        assert_eq!(
            call.to_string(),
            "virtualinvoke l0.<java.lang.String: int length()>()"
        );

        let field = Value::field(
            Value::local(LocalId::new(1)),
            FieldRef::new("A", "f", Type::Int),
        );
        assert_eq!(field.to_string(), "l1.<A: int f>");
        assert!(field.is_heap_location());
        assert!(Value::new_array(Type::Int, Value::int(3)).is_allocation());
    }

    #[test]
    fn test_receiver_kinds() {
        assert!(!InvokeKind::Static.has_receiver());
        assert!(!InvokeKind::Dynamic.has_receiver());
        assert!(InvokeKind::Interface.has_receiver());
    }
}
