//! Variables of the produced IR.
//!
//! A [`Variable`] is created once and then shared through [`VariableRc`]. Identity is the
//! [`VarId`] handed out at creation, never the name: a temporary and a source local may both
//! be called `x` and still be distinct.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crate::types::Type;

static NEXT_VARIABLE_ID: AtomicUsize = AtomicUsize::new(0);

/// Shared handle to a [`Variable`].
pub type VariableRc = Arc<Variable>;

/// Process-wide unique variable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    fn fresh() -> Self {
        VarId(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a variable stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// A local of the source method
    Local,
    /// The n-th declared parameter
    Parameter(usize),
    /// The receiver of an instance method
    This,
    /// The distinguished return variable
    Return,
    /// The caught exception of a handler
    Exception,
    /// A temporary introduced during translation
    Temporary,
    /// A program-wide variable: static field or heap map
    Global,
}

/// A named, typed storage location.
#[derive(Debug)]
pub struct Variable {
    id: VarId,
    name: String,
    ty: Type,
    kind: VariableKind,
}

impl Variable {
    /// Creates a new variable with a fresh identity.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type, kind: VariableKind) -> VariableRc {
        Arc::new(Variable {
            id: VarId::fresh(),
            name: name.into(),
            ty,
            kind,
        })
    }

    /// Unique identity of this variable.
    #[must_use]
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Name, for display only.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// What this variable stands for.
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Returns true for static fields and heap maps.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.kind == VariableKind::Global
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_not_name() {
        let a = Variable::new("x", Type::Int, VariableKind::Local);
        let b = Variable::new("x", Type::Int, VariableKind::Temporary);
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, Arc::clone(&a));
    }

    #[test]
    fn test_accessors() {
        let v = Variable::new("$heap<A.f>", Type::Int, VariableKind::Global);
        assert_eq!(v.name(), "$heap<A.f>");
        assert_eq!(v.ty(), &Type::Int);
        assert!(v.is_global());
        assert_eq!(v.to_string(), "$heap<A.f>");
    }
}
