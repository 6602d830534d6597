//! Expression trees of the produced IR.
//!
//! An [`Expression`] is an owned, immutable tree. Variables at the leaves are shared handles
//! (their identity matters), every interior node is uniquely owned. Cloning therefore yields a
//! structurally independent tree, which is what [`Expression::deep_copy`] relies on: two edge
//! guards built from the same source condition never share a node.

use std::{fmt, sync::Arc};

use strum::{Display, EnumIter};

use crate::{cfg::VariableRc, types::Type};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum UnaryOp {
    /// Arithmetic negation
    #[strum(to_string = "-")]
    Neg,
    /// Logical negation
    #[strum(to_string = "!")]
    LNot,
}

/// Binary operators.
///
/// Besides the arithmetic, bitwise and comparison operators of the instruction stream this
/// includes the logical connectives used by lowerings and [`BinaryOp::PoLeq`], the runtime
/// subtype relation between two type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BinaryOp {
    /// `+`
    #[strum(to_string = "+")]
    Add,
    /// `-`
    #[strum(to_string = "-")]
    Sub,
    /// `*`
    #[strum(to_string = "*")]
    Mul,
    /// `/`
    #[strum(to_string = "/")]
    Div,
    /// `%`
    #[strum(to_string = "%")]
    Rem,
    /// bitwise and
    #[strum(to_string = "&")]
    BitAnd,
    /// bitwise or
    #[strum(to_string = "|")]
    BitOr,
    /// bitwise xor
    #[strum(to_string = "^")]
    Xor,
    /// shift left
    #[strum(to_string = "<<")]
    Shl,
    /// arithmetic shift right
    #[strum(to_string = ">>")]
    Shr,
    /// logical shift right
    #[strum(to_string = ">>>")]
    Ushr,
    /// three-way comparison of longs (-1, 0, 1)
    #[strum(to_string = "cmp")]
    Cmp,
    /// three-way float comparison, NaN yields -1
    #[strum(to_string = "cmpl")]
    Cmpl,
    /// three-way float comparison, NaN yields 1
    #[strum(to_string = "cmpg")]
    Cmpg,
    /// `==`
    #[strum(to_string = "==")]
    Eq,
    /// `!=`
    #[strum(to_string = "!=")]
    Ne,
    /// `<`
    #[strum(to_string = "<")]
    Lt,
    /// `<=`
    #[strum(to_string = "<=")]
    Le,
    /// `>`
    #[strum(to_string = ">")]
    Gt,
    /// `>=`
    #[strum(to_string = ">=")]
    Ge,
    /// logical and
    #[strum(to_string = "&&")]
    LAnd,
    /// logical or
    #[strum(to_string = "||")]
    LOr,
    /// logical implication
    #[strum(to_string = "==>")]
    Implies,
    /// runtime subtype order on type tags
    #[strum(to_string = "<:")]
    PoLeq,
}

impl BinaryOp {
    /// Returns true for operators producing a boolean.
    #[must_use]
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::LAnd
                | BinaryOp::LOr
                | BinaryOp::Implies
                | BinaryOp::PoLeq
        )
    }
}

/// Constant leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integral constant of any width
    Int(i64),
    /// Floating point constant of any width
    Real(f64),
    /// Boolean constant
    Bool(bool),
    /// The null reference
    Null,
    /// String constant
    Str(Arc<str>),
    /// A type used as a value: class constants and type tags
    Type(Type),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{value}"),
            Literal::Real(value) => write!(f, "{value:?}"),
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Null => write!(f, "null"),
            Literal::Str(value) => write!(f, "{value:?}"),
            Literal::Type(ty) => write!(f, "{ty}.class"),
        }
    }
}

/// An immutable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A variable
    Identifier(VariableRc),
    /// A constant
    Literal(Literal),
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expression>,
    },
    /// `left op right`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// A slot of a heap map, `map[keys]`; an lvalue on the left of an assignment.
    Access {
        /// The heap map variable
        map: VariableRc,
        /// Slot address, e.g. `[object]` or `[array, index]`
        keys: Vec<Expression>,
    },
    /// A fresh reference of the given allocated type.
    New(Type),
}

impl Expression {
    /// Identifier expression for `var`.
    #[must_use]
    pub fn var(var: &VariableRc) -> Self {
        Expression::Identifier(Arc::clone(var))
    }

    /// Integer literal.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expression::Literal(Literal::Int(value))
    }

    /// Boolean literal.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Expression::Literal(Literal::Bool(value))
    }

    /// Type-tag literal.
    #[must_use]
    pub fn type_tag(ty: Type) -> Self {
        Expression::Literal(Literal::Type(ty))
    }

    /// `!operand`
    #[must_use]
    pub fn lnot(operand: Expression) -> Self {
        Expression::Unary {
            op: UnaryOp::LNot,
            operand: Box::new(operand),
        }
    }

    /// `left op right`
    #[must_use]
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left == right`
    #[must_use]
    pub fn equal(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    /// `left <: right`
    #[must_use]
    pub fn po_leq(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOp::PoLeq, left, right)
    }

    /// `map[keys]`
    #[must_use]
    pub fn access(map: &VariableRc, keys: Vec<Expression>) -> Self {
        Expression::Access {
            map: Arc::clone(map),
            keys,
        }
    }

    /// Returns the variable of an identifier expression.
    #[must_use]
    pub fn as_variable(&self) -> Option<&VariableRc> {
        match self {
            Expression::Identifier(var) => Some(var),
            _ => None,
        }
    }

    /// Returns true if the expression can appear on the left of an assignment.
    #[must_use]
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Expression::Identifier(_) | Expression::Access { .. })
    }

    /// A structurally independent copy.
    ///
    /// Variables stay shared; every operator node is freshly allocated.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Every variable read when evaluating this expression, in first-occurrence order.
    #[must_use]
    pub fn variables(&self) -> Vec<VariableRc> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    /// Appends the variables of this expression to `out`, skipping ones already present.
    pub(crate) fn collect_variables(&self, out: &mut Vec<VariableRc>) {
        match self {
            Expression::Identifier(var) => push_unique(out, var),
            Expression::Literal(_) | Expression::New(_) => {}
            Expression::Unary { operand, .. } => operand.collect_variables(out),
            Expression::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::Access { map, keys } => {
                push_unique(out, map);
                for key in keys {
                    key.collect_variables(out);
                }
            }
        }
    }
}

pub(crate) fn push_unique(out: &mut Vec<VariableRc>, var: &VariableRc) {
    if !out.iter().any(|v| v.id() == var.id()) {
        out.push(Arc::clone(var));
    }
}

impl From<&VariableRc> for Expression {
    fn from(var: &VariableRc) -> Self {
        Expression::var(var)
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(var) => write!(f, "{}", var.name()),
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expression::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expression::Access { map, keys } => {
                write!(f, "{}[", map.name())?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}")?;
                }
                write!(f, "]")
            }
            Expression::New(ty) => write!(f, "new {ty}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::cfg::{Variable, VariableKind};

    #[test]
    fn test_display() {
        let x = Variable::new("x", Type::Int, VariableKind::Local);
        let heap = Variable::new("$heap<A.f>", Type::Int, VariableKind::Global);

        let cond = Expression::lnot(Expression::binary(
            BinaryOp::Lt,
            Expression::var(&x),
            Expression::int(10),
        ));
        assert_eq!(cond.to_string(), "!(x < 10)");

        let slot = Expression::access(&heap, vec![Expression::var(&x)]);
        assert_eq!(slot.to_string(), "$heap<A.f>[x]");
        assert_eq!(
            Expression::po_leq(slot, Expression::type_tag(Type::class("A"))).to_string(),
            "($heap<A.f>[x] <: A.class)"
        );
    }

    #[test]
    fn test_operator_symbols_are_distinct() {
        let symbols: HashSet<String> = BinaryOp::iter().map(|op| op.to_string()).collect();
        assert_eq!(symbols.len(), BinaryOp::iter().count());
        assert!(BinaryOp::PoLeq.is_predicate());
        assert!(!BinaryOp::Add.is_predicate());
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let x = Variable::new("x", Type::Int, VariableKind::Local);
        let original = Expression::equal(Expression::var(&x), Expression::int(0));
        let copy = original.deep_copy();

        assert_eq!(original, copy);
        match (&original, &copy) {
            (Expression::Binary { left: l1, .. }, Expression::Binary { left: l2, .. }) => {
                assert!(!std::ptr::eq(l1.as_ref(), l2.as_ref()));
            }
            _ => panic!("expected binary expressions"),
        }
    }

    #[test]
    fn test_variables_dedup() {
        let x = Variable::new("x", Type::Int, VariableKind::Local);
        let y = Variable::new("y", Type::Int, VariableKind::Local);
        let heap = Variable::new("$array<int>", Type::Int, VariableKind::Global);
        let expr = Expression::binary(
            BinaryOp::Add,
            Expression::access(&heap, vec![Expression::var(&x), Expression::var(&y)]),
            Expression::var(&x),
        );

        let vars = expr.variables();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0], heap);
        assert_eq!(vars[1], x);
        assert_eq!(vars[2], y);
    }

    #[test]
    fn test_lvalues() {
        let x = Variable::new("x", Type::Int, VariableKind::Local);
        assert!(Expression::var(&x).is_lvalue());
        assert!(Expression::access(&x, vec![]).is_lvalue());
        assert!(!Expression::int(1).is_lvalue());
        assert_eq!(Expression::var(&x).as_variable(), Some(&x));
    }
}
