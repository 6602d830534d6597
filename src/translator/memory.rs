//! Heap modelling for field and array accesses.
//!
//! Every field or array reference in the instruction stream becomes exactly one read or one
//! write statement produced by a [`MemoryModel`]. The translator appends the statement to
//! the current block, so accesses keep their program order.
//!
//! [`FieldHeapModel`] splits the heap by field (Burstall-Bornat): each instance field `C.f`
//! is a global map `$heap<C.f>` from object to value, and each array element type `T` is a
//! map `$array<T>` from `(array, index)` to value. Two accesses can only alias if they go
//! through the same map. Static fields are plain globals named after the field.

use crate::{
    cfg::{Expression, SourceLocation, Statement, VariableRc},
    program::Program,
    types::{FieldRef, Type},
    Result,
};

/// Lowers heap accesses to statements.
///
/// Implementations must be stateless with respect to individual methods: the same model is
/// shared by every translation of a [`Program`], possibly from several threads at once.
/// Synthetic globals should be obtained through [`Program::global`] so that all methods
/// agree on them.
///
/// # Errors
///
/// Every operation fails with [`crate::Error::InvariantViolation`] when the map or global it
/// needs already exists with a different type.
pub trait MemoryModel: Send + Sync {
    /// `dest := base.field`
    fn heap_read(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        field: &FieldRef,
        dest: &VariableRc,
    ) -> Result<Statement>;

    /// `base.field := value`
    fn heap_write(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        field: &FieldRef,
        value: Expression,
    ) -> Result<Statement>;

    /// `dest := C.field`
    fn static_read(
        &self,
        program: &Program,
        location: SourceLocation,
        field: &FieldRef,
        dest: &VariableRc,
    ) -> Result<Statement>;

    /// `C.field := value`
    fn static_write(
        &self,
        program: &Program,
        location: SourceLocation,
        field: &FieldRef,
        value: Expression,
    ) -> Result<Statement>;

    /// `dest := base[index]` for an array of `element`.
    fn array_read(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        index: Expression,
        element: &Type,
        dest: &VariableRc,
    ) -> Result<Statement>;

    /// `base[index] := value` for an array of `element`.
    fn array_write(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        index: Expression,
        element: &Type,
        value: Expression,
    ) -> Result<Statement>;

    /// The length of string `base` as an expression.
    fn string_length(&self, program: &Program, base: Expression) -> Result<Expression>;
}

/// One heap map per field and one per array element type.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldHeapModel;

impl FieldHeapModel {
    /// Creates the model.
    #[must_use]
    pub fn new() -> Self {
        FieldHeapModel
    }

    fn field_map(program: &Program, field: &FieldRef) -> Result<VariableRc> {
        program.global(
            &format!("$heap<{}>", field.qualified_name()),
            Type::Map {
                keys: vec![Type::Class(field.class.clone())],
                value: Box::new(field.ty.clone()),
            },
        )
    }

    fn array_map(program: &Program, element: &Type) -> Result<VariableRc> {
        program.global(
            &format!("$array<{element}>"),
            Type::Map {
                keys: vec![Type::array_of(element.clone()), Type::Int],
                value: Box::new(element.clone()),
            },
        )
    }

    fn static_variable(program: &Program, field: &FieldRef) -> Result<VariableRc> {
        program.global(&field.qualified_name(), field.ty.clone())
    }
}

impl MemoryModel for FieldHeapModel {
    fn heap_read(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        field: &FieldRef,
        dest: &VariableRc,
    ) -> Result<Statement> {
        let map = Self::field_map(program, field)?;
        Ok(Statement::assign(
            location,
            Expression::var(dest),
            Expression::access(&map, vec![base]),
        ))
    }

    fn heap_write(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        field: &FieldRef,
        value: Expression,
    ) -> Result<Statement> {
        let map = Self::field_map(program, field)?;
        Ok(Statement::assign(location, Expression::access(&map, vec![base]), value))
    }

    fn static_read(
        &self,
        program: &Program,
        location: SourceLocation,
        field: &FieldRef,
        dest: &VariableRc,
    ) -> Result<Statement> {
        let global = Self::static_variable(program, field)?;
        Ok(Statement::assign(location, Expression::var(dest), Expression::var(&global)))
    }

    fn static_write(
        &self,
        program: &Program,
        location: SourceLocation,
        field: &FieldRef,
        value: Expression,
    ) -> Result<Statement> {
        let global = Self::static_variable(program, field)?;
        Ok(Statement::assign(location, Expression::var(&global), value))
    }

    fn array_read(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        index: Expression,
        element: &Type,
        dest: &VariableRc,
    ) -> Result<Statement> {
        let map = Self::array_map(program, element)?;
        Ok(Statement::assign(
            location,
            Expression::var(dest),
            Expression::access(&map, vec![base, index]),
        ))
    }

    fn array_write(
        &self,
        program: &Program,
        location: SourceLocation,
        base: Expression,
        index: Expression,
        element: &Type,
        value: Expression,
    ) -> Result<Statement> {
        let map = Self::array_map(program, element)?;
        Ok(Statement::assign(location, Expression::access(&map, vec![base, index]), value))
    }

    fn string_length(&self, program: &Program, base: Expression) -> Result<Expression> {
        let config = program.config();
        let field = FieldRef::new(&config.string_class, &config.length_field_name, Type::Int);
        Ok(Expression::access(&Self::field_map(program, &field)?, vec![base]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::{StatementKind, Variable, VariableKind},
        Error,
    };

    fn local(name: &str, ty: Type) -> VariableRc {
        Variable::new(name, ty, VariableKind::Local)
    }

    #[test]
    fn test_field_read_and_write_share_map() {
        let program = Program::new();
        let model = FieldHeapModel::new();
        let field = FieldRef::new("A", "count", Type::Int);
        let (obj, x) = (local("o", Type::class("A")), local("x", Type::Int));

        let read = model.heap_read(
            &program,
            SourceLocation::line(1),
            Expression::var(&obj),
            &field,
            &x,
        )
        .unwrap();
        let write = model.heap_write(
            &program,
            SourceLocation::line(2),
            Expression::var(&obj),
            &field,
            Expression::int(3),
        )
        .unwrap();

        assert_eq!(read.to_string(), "x := $heap<A.count>[o]");
        assert_eq!(write.to_string(), "$heap<A.count>[o] := 3");
        assert_eq!(read.uses()[0], write.defs()[0]);
        assert_eq!(program.global_count(), 1);
    }

    #[test]
    fn test_array_access_keys() {
        let program = Program::new();
        let model = FieldHeapModel::new();
        let (arr, i, x) = (
            local("a", Type::array_of(Type::Int)),
            local("i", Type::Int),
            local("x", Type::Int),
        );

        let read = model.array_read(
            &program,
            SourceLocation::default(),
            Expression::var(&arr),
            Expression::var(&i),
            &Type::Int,
            &x,
        )
        .unwrap();
        assert_eq!(read.to_string(), "x := $array<int>[a, i]");

        let StatementKind::Assign { rhs, .. } = read.kind() else {
            panic!("expected assignment");
        };
        let Expression::Access { map, .. } = rhs else {
            panic!("expected access");
        };
        assert_eq!(map.ty().to_string(), "[int[],int]int");
    }

    #[test]
    fn test_static_fields_are_globals() {
        let program = Program::new();
        let model = FieldHeapModel::new();
        let field = FieldRef::new("A", "LIMIT", Type::Long);
        let x = local("x", Type::Long);

        let read = model
            .static_read(&program, SourceLocation::default(), &field, &x)
            .unwrap();
        assert_eq!(read.to_string(), "x := A.LIMIT");
        assert!(read.uses()[0].is_global());
    }

    #[test]
    fn test_string_length() {
        let program = Program::new();
        let s = local("s", Type::class("java.lang.String"));
        let length = FieldHeapModel::new()
            .string_length(&program, Expression::var(&s))
            .unwrap();
        assert_eq!(length.to_string(), "$heap<java.lang.String.$length>[s]");
    }

    #[test]
    fn test_field_type_conflict_is_fatal() {
        let program = Program::new();
        let model = FieldHeapModel::new();
        let obj = local("o", Type::class("A"));

        let as_int = FieldRef::new("A", "f", Type::Int);
        model
            .heap_write(
                &program,
                SourceLocation::default(),
                Expression::var(&obj),
                &as_int,
                Expression::int(1),
            )
            .unwrap();

        let as_long = FieldRef::new("A", "f", Type::Long);
        let result = model.heap_read(
            &program,
            SourceLocation::default(),
            Expression::var(&obj),
            &as_long,
            &local("x", Type::Long),
        );
        assert!(matches!(result, Err(Error::InvariantViolation { .. })));
        assert_eq!(program.global_count(), 1);
    }
}
