//! Statements of the produced IR.
//!
//! There are exactly four kinds: assignment, assertion, assumption and call. Every
//! field/array access of the source program has already been turned into an assignment
//! reading or writing a heap map slot (see [`crate::translator::MemoryModel`]), so use/def
//! queries see heap effects as ordinary variable uses and definitions of the map variables.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::cfg::{
    expression::push_unique, Expression, Method, MethodRc, SourceLocation, VariableRc,
};

/// The callee of a [`StatementKind::Call`].
///
/// Resolved callees are held weakly: a recursive method's body points back at the method
/// itself, and the program's method cache is what keeps callees alive.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// A resolved method from the program's method cache.
    Method {
        /// The cached method
        method: Weak<Method>,
        /// Its signature, readable after the method is gone
        signature: Arc<str>,
    },
    /// An unresolved callee, e.g. an indirect invocation. Carries the signature for display.
    Opaque(Arc<str>),
}

impl CallTarget {
    /// Target for a resolved method.
    #[must_use]
    pub fn resolved(method: &MethodRc) -> Self {
        CallTarget::Method {
            method: Arc::downgrade(method),
            signature: Arc::from(method.signature()),
        }
    }

    /// Returns the resolved method, if any and still alive.
    #[must_use]
    pub fn method(&self) -> Option<MethodRc> {
        match self {
            CallTarget::Method { method, .. } => method.upgrade(),
            CallTarget::Opaque(_) => None,
        }
    }

    /// Signature of the callee.
    #[must_use]
    pub fn signature(&self) -> &str {
        match self {
            CallTarget::Method { signature, .. } | CallTarget::Opaque(signature) => signature,
        }
    }
}

impl PartialEq for CallTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CallTarget::Method { method: a, .. }, CallTarget::Method { method: b, .. }) => {
                Weak::ptr_eq(a, b)
            }
            (CallTarget::Opaque(a), CallTarget::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

/// The four statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `lhs := rhs`; `lhs` is an identifier or a heap map slot.
    Assign {
        /// Assigned location
        lhs: Expression,
        /// Assigned value
        rhs: Expression,
    },
    /// Property to be proven.
    Assert(Expression),
    /// Property taken for granted.
    Assume(Expression),
    /// Method call.
    Call {
        /// Callee
        target: CallTarget,
        /// Arguments; instance calls carry the receiver object as first argument
        args: Vec<Expression>,
        /// Location the returned value is stored to, if the result is used
        receiver: Option<Expression>,
    },
}

/// A statement with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    location: SourceLocation,
    kind: StatementKind,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(location: SourceLocation, kind: StatementKind) -> Self {
        Statement { location, kind }
    }

    /// `lhs := rhs`
    #[must_use]
    pub fn assign(location: SourceLocation, lhs: Expression, rhs: Expression) -> Self {
        Self::new(location, StatementKind::Assign { lhs, rhs })
    }

    /// `assert(condition)`
    #[must_use]
    pub fn assert(location: SourceLocation, condition: Expression) -> Self {
        Self::new(location, StatementKind::Assert(condition))
    }

    /// `assume(condition)`
    #[must_use]
    pub fn assume(location: SourceLocation, condition: Expression) -> Self {
        Self::new(location, StatementKind::Assume(condition))
    }

    /// `receiver := call target(args)`
    #[must_use]
    pub fn call(
        location: SourceLocation,
        target: CallTarget,
        args: Vec<Expression>,
        receiver: Option<Expression>,
    ) -> Self {
        Self::new(
            location,
            StatementKind::Call {
                target,
                args,
                receiver,
            },
        )
    }

    /// The statement kind and its operands.
    #[must_use]
    pub fn kind(&self) -> &StatementKind {
        &self.kind
    }

    /// Source location of the instruction this statement was produced from.
    #[must_use]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Source line, if known.
    #[must_use]
    pub fn source_line(&self) -> Option<u32> {
        self.location.line
    }

    /// Variables read by this statement, in first-occurrence order.
    ///
    /// A store into a heap map slot reads the map as well as writing it: the other slots
    /// are carried over.
    #[must_use]
    pub fn uses(&self) -> Vec<VariableRc> {
        let mut out = Vec::new();
        match &self.kind {
            StatementKind::Assign { lhs, rhs } => {
                rhs.collect_variables(&mut out);
                collect_target_uses(lhs, &mut out);
            }
            StatementKind::Assert(condition) | StatementKind::Assume(condition) => {
                condition.collect_variables(&mut out);
            }
            StatementKind::Call { args, receiver, .. } => {
                for arg in args {
                    arg.collect_variables(&mut out);
                }
                if let Some(receiver) = receiver {
                    collect_target_uses(receiver, &mut out);
                }
            }
        }
        out
    }

    /// Variables written by this statement.
    #[must_use]
    pub fn defs(&self) -> Vec<VariableRc> {
        let target = match &self.kind {
            StatementKind::Assign { lhs, .. } => Some(lhs),
            StatementKind::Call { receiver, .. } => receiver.as_ref(),
            StatementKind::Assert(_) | StatementKind::Assume(_) => None,
        };

        match target {
            Some(Expression::Identifier(var)) | Some(Expression::Access { map: var, .. }) => {
                vec![Arc::clone(var)]
            }
            _ => Vec::new(),
        }
    }

    /// Union of [`Self::uses`] and [`Self::defs`].
    #[must_use]
    pub fn all_variables(&self) -> Vec<VariableRc> {
        let mut out = self.uses();
        for var in self.defs() {
            push_unique(&mut out, &var);
        }
        out
    }

    /// [`Self::uses`] as identifier expressions.
    #[must_use]
    pub fn use_identifiers(&self) -> Vec<Expression> {
        self.uses().iter().map(Expression::var).collect()
    }

    /// [`Self::defs`] as identifier expressions.
    #[must_use]
    pub fn def_identifiers(&self) -> Vec<Expression> {
        self.defs().iter().map(Expression::var).collect()
    }

    /// [`Self::all_variables`] as identifier expressions.
    #[must_use]
    pub fn identifier_expressions(&self) -> Vec<Expression> {
        self.all_variables().iter().map(Expression::var).collect()
    }

    /// A copy sharing no expression node with `self`.
    ///
    /// Variables and call targets are identities and stay shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

fn collect_target_uses(target: &Expression, out: &mut Vec<VariableRc>) {
    if let Expression::Access { map, keys } = target {
        push_unique(out, map);
        for key in keys {
            key.collect_variables(out);
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::Assign { lhs, rhs } => write!(f, "{lhs} := {rhs}"),
            StatementKind::Assert(condition) => write!(f, "assert({condition})"),
            StatementKind::Assume(condition) => write!(f, "assume({condition})"),
            StatementKind::Call {
                target,
                args,
                receiver,
            } => {
                if let Some(receiver) = receiver {
                    write!(f, "{receiver} := ")?;
                }
                write!(f, "call {}(", target.signature())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::{BinaryOp, Variable, VariableKind},
        types::Type,
    };

    fn var(name: &str) -> VariableRc {
        Variable::new(name, Type::Int, VariableKind::Local)
    }

    #[test]
    fn test_assign_uses_defs() {
        let (x, y) = (var("x"), var("y"));
        let stmt = Statement::assign(
            SourceLocation::line(3),
            Expression::var(&x),
            Expression::binary(BinaryOp::Add, Expression::var(&y), Expression::int(1)),
        );

        assert_eq!(stmt.uses(), vec![y.clone()]);
        assert_eq!(stmt.defs(), vec![x.clone()]);
        assert_eq!(stmt.all_variables(), vec![y, x]);
        assert_eq!(stmt.source_line(), Some(3));
        assert_eq!(stmt.to_string(), "x := (y + 1)");
    }

    #[test]
    fn test_heap_store_uses_and_defines_map() {
        let (r, v) = (var("r"), var("v"));
        let heap = Variable::new("$heap<A.f>", Type::Int, VariableKind::Global);
        let stmt = Statement::assign(
            SourceLocation::default(),
            Expression::access(&heap, vec![Expression::var(&r)]),
            Expression::var(&v),
        );

        let uses = stmt.uses();
        assert_eq!(uses.len(), 3);
        assert!(uses.contains(&heap) && uses.contains(&r) && uses.contains(&v));
        assert_eq!(stmt.defs(), vec![heap]);
        assert_eq!(stmt.source_line(), None);
    }

    #[test]
    fn test_assert_has_no_defs() {
        let c = var("c");
        let stmt = Statement::assume(SourceLocation::default(), Expression::var(&c));
        assert!(stmt.defs().is_empty());
        assert_eq!(stmt.use_identifiers(), vec![Expression::var(&c)]);
        assert!(stmt.def_identifiers().is_empty());
    }

    #[test]
    fn test_opaque_call() {
        let (a, r) = (var("a"), var("r"));
        let stmt = Statement::call(
            SourceLocation::default(),
            CallTarget::Opaque(Arc::from("<A: int f(int)>")),
            vec![Expression::var(&a)],
            Some(Expression::var(&r)),
        );

        assert_eq!(stmt.uses(), vec![a.clone()]);
        assert_eq!(stmt.defs(), vec![r.clone()]);
        assert_eq!(stmt.identifier_expressions().len(), 2);
        assert_eq!(stmt.to_string(), "r := call <A: int f(int)>(a)");
    }

    #[test]
    fn test_deep_copy_equal() {
        let x = var("x");
        let stmt = Statement::assert(
            SourceLocation::new("A.java", 9),
            Expression::lnot(Expression::var(&x)),
        );
        let copy = stmt.deep_copy();
        assert_eq!(stmt, copy);
        assert_eq!(copy.location(), &SourceLocation::new("A.java", 9));
    }
}
