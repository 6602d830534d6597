//! Operand and assignment translation.
//!
//! Operand trees become [`Expression`]s. Parts that are not pure expressions in the output
//! (heap reads, calls, array lengths, type tests) are evaluated into fresh temporaries
//! first; their statements go into the open block ahead of the statement that uses them.

use crate::{
    cfg::{Expression, Literal, Statement, VariableRc},
    input::{Constant, InvokeExpr, LocalId, Value},
    translator::stmt::StmtTranslator,
    types::Type,
    Result,
};

impl StmtTranslator<'_, '_> {
    /// Translates an operand to an expression.
    pub(crate) fn translate_value(&mut self, value: &Value) -> Result<Expression> {
        match value {
            Value::Local(id) => Ok(Expression::var(&self.local_variable(*id)?)),
            Value::Constant(constant) => Ok(Expression::Literal(literal(constant))),
            Value::Unary { op, operand } => Ok(Expression::Unary {
                op: *op,
                operand: Box::new(self.translate_value(operand)?),
            }),
            Value::Binary { op, left, right } => {
                let left = self.translate_value(left)?;
                let right = self.translate_value(right)?;
                Ok(Expression::binary(*op, left, right))
            }
            // Casts are checked by the runtime, not here.
            Value::Cast { operand, .. } => self.translate_value(operand),
            Value::InstanceOf { ty, operand } => {
                let operand = self.translate_value(operand)?;
                let tag = self.read_type_tag(operand)?;
                Ok(Expression::po_leq(tag, Expression::type_tag(ty.clone())))
            }
            Value::Length(array) => {
                let temp = self.info.fresh_temp("$tmp", Type::Int);
                self.read_length(array, &temp)?;
                Ok(Expression::var(&temp))
            }
            Value::New(_) | Value::NewArray { .. } | Value::NewMultiArray { .. } => {
                Ok(Expression::New(allocated_type(value)))
            }
            Value::InstanceField { .. } | Value::StaticField(_) | Value::ArrayElement { .. } => {
                let ty = self.static_type(value)?;
                let temp = self.info.fresh_temp("$tmp", ty);
                self.read_heap(value, &temp)?;
                Ok(Expression::var(&temp))
            }
            Value::Invoke(expr) => {
                let temp = self
                    .info
                    .fresh_temp("$tmp", expr.method.return_type.clone());
                self.translate_invoke(expr, Some(Expression::var(&temp)))?;
                Ok(Expression::var(&temp))
            }
            Value::Parameter { index, .. } => match self.info.parameter(*index) {
                Some(param) => Ok(Expression::var(param)),
                None => Err(invariant_error!(
                    self.info.site(),
                    "parameter {} out of range",
                    index
                )),
            },
            Value::This(_) => match self.info.this_variable() {
                Some(this) => Ok(Expression::var(this)),
                None => Err(invariant_error!(
                    self.info.site(),
                    "receiver reference in a static method"
                )),
            },
            Value::CaughtException(ty) => Ok(Expression::var(&self.info.exception_variable(ty))),
        }
    }

    /// Translates `lhs = rhs`.
    pub(crate) fn translate_assign(&mut self, lhs: &Value, rhs: &Value) -> Result<()> {
        if lhs.is_heap_location() && rhs.is_heap_location() {
            return Err(invariant_error!(
                self.info.site(),
                "heap reference on both sides of an assignment"
            ));
        }

        if let Value::Invoke(expr) = rhs {
            return self.assign_call(lhs, expr);
        }

        if lhs.is_heap_location() {
            let value = self.translate_value(rhs)?;
            return self.write_heap(lhs, value);
        }

        let dest = self.target_variable(lhs)?;
        if rhs.is_heap_location() {
            return self.read_heap(rhs, &dest);
        }
        if let Value::Length(array) = rhs {
            return self.read_length(array, &dest);
        }

        let value = self.translate_value(rhs)?;
        self.emit(Statement::assign(
            self.location.clone(),
            Expression::var(&dest),
            value,
        ))?;

        if rhs.is_allocation() {
            self.initialize_allocation(&dest, rhs)?;
        }
        Ok(())
    }

    /// Translates `local := @parameter / @this / @caughtexception`.
    pub(crate) fn translate_identity(&mut self, local: LocalId, rhs: &Value) -> Result<()> {
        let dest = self.local_variable(local)?;
        let value = self.translate_value(rhs)?;
        self.emit(Statement::assign(
            self.location.clone(),
            Expression::var(&dest),
            value,
        ))
    }

    fn assign_call(&mut self, lhs: &Value, expr: &InvokeExpr) -> Result<()> {
        if lhs.is_heap_location() {
            let temp = self
                .info
                .fresh_temp("$tmp", expr.method.return_type.clone());
            self.translate_invoke(expr, Some(Expression::var(&temp)))?;
            return self.write_heap(lhs, Expression::var(&temp));
        }

        let dest = self.target_variable(lhs)?;
        self.translate_invoke(expr, Some(Expression::var(&dest)))
    }

    /// Type tag, and for one-dimensional arrays the length assumption.
    fn initialize_allocation(&mut self, dest: &VariableRc, allocation: &Value) -> Result<()> {
        let program = self.program;
        let type_field = program.type_field();
        let tag_write = program.memory_model().heap_write(
            program,
            self.location.clone(),
            Expression::var(dest),
            &type_field,
            Expression::type_tag(allocated_type(allocation)),
        )?;
        self.emit(tag_write)?;

        if let Value::NewArray { element, size } = allocation {
            let size = self.translate_value(size)?;
            let length = self.info.fresh_temp("$arrSizeLocal", Type::Int);
            let length_field = program.array_class(element).length_field.clone();
            let read = program.memory_model().heap_read(
                program,
                self.location.clone(),
                Expression::var(dest),
                &length_field,
                &length,
            )?;
            self.emit(read)?;
            self.emit(Statement::assume(
                self.location.clone(),
                Expression::equal(Expression::var(&length), size),
            ))?;
        }
        Ok(())
    }

    /// Emits `dest := location` for a field or array reference.
    fn read_heap(&mut self, location: &Value, dest: &VariableRc) -> Result<()> {
        let program = self.program;
        let memory = program.memory_model();
        let statement = match location {
            Value::InstanceField { base, field } => {
                let base = self.translate_value(base)?;
                memory.heap_read(program, self.location.clone(), base, field, dest)?
            }
            Value::StaticField(field) => {
                memory.static_read(program, self.location.clone(), field, dest)?
            }
            Value::ArrayElement { base, index } => {
                let element = self.element_type(base)?;
                let base = self.translate_value(base)?;
                let index = self.translate_value(index)?;
                memory.array_read(program, self.location.clone(), base, index, &element, dest)?
            }
            other => {
                return Err(invariant_error!(
                    self.info.site(),
                    "{} is not a heap location",
                    other
                ))
            }
        };
        self.emit(statement)
    }

    /// Emits `location := value` for a field or array reference.
    fn write_heap(&mut self, location: &Value, value: Expression) -> Result<()> {
        let program = self.program;
        let memory = program.memory_model();
        let statement = match location {
            Value::InstanceField { base, field } => {
                let base = self.translate_value(base)?;
                memory.heap_write(program, self.location.clone(), base, field, value)?
            }
            Value::StaticField(field) => {
                memory.static_write(program, self.location.clone(), field, value)?
            }
            Value::ArrayElement { base, index } => {
                let element = self.element_type(base)?;
                let base = self.translate_value(base)?;
                let index = self.translate_value(index)?;
                memory.array_write(program, self.location.clone(), base, index, &element, value)?
            }
            other => {
                return Err(invariant_error!(
                    self.info.site(),
                    "{} is not a heap location",
                    other
                ))
            }
        };
        self.emit(statement)
    }

    /// Emits `dest := array.$length` on the synthetic class of the array's element type.
    fn read_length(&mut self, array: &Value, dest: &VariableRc) -> Result<()> {
        let element = self.element_type(array)?;
        let program = self.program;
        let length_field = program.array_class(&element).length_field.clone();
        let base = self.translate_value(array)?;
        let read = program.memory_model().heap_read(
            program,
            self.location.clone(),
            base,
            &length_field,
            dest,
        )?;
        self.emit(read)
    }

    /// Reads the type tag of `object` into a fresh temporary.
    pub(crate) fn read_type_tag(&mut self, object: Expression) -> Result<Expression> {
        let program = self.program;
        let type_field = program.type_field();
        let temp = self.info.fresh_temp("$tmp", type_field.ty.clone());
        let read = program.memory_model().heap_read(
            program,
            self.location.clone(),
            object,
            &type_field,
            &temp,
        )?;
        self.emit(read)?;
        Ok(Expression::var(&temp))
    }

    fn local_variable(&self, id: LocalId) -> Result<VariableRc> {
        self.info.local(id).cloned().ok_or_else(|| {
            invariant_error!(self.info.site(), "local {} is not declared", id)
        })
    }

    fn target_variable(&self, lhs: &Value) -> Result<VariableRc> {
        match lhs {
            Value::Local(id) => self.local_variable(*id),
            other => Err(invariant_error!(
                self.info.site(),
                "{} is not assignable",
                other
            )),
        }
    }

    fn static_type(&self, value: &Value) -> Result<Type> {
        self.info.body().type_of(value).ok_or_else(|| {
            invariant_error!(self.info.site(), "cannot determine the type of {}", value)
        })
    }

    fn element_type(&self, array: &Value) -> Result<Type> {
        match self.static_type(array)? {
            Type::Array(element) => Ok(*element),
            other => Err(invariant_error!(
                self.info.site(),
                "{} has non-array type {}",
                array,
                other
            )),
        }
    }
}

fn literal(constant: &Constant) -> Literal {
    match constant {
        Constant::Int(value) => Literal::Int(i64::from(*value)),
        Constant::Long(value) => Literal::Int(*value),
        Constant::Float(value) => Literal::Real(f64::from(*value)),
        Constant::Double(value) => Literal::Real(*value),
        Constant::Boolean(value) => Literal::Bool(*value),
        Constant::Null => Literal::Null,
        Constant::String(value) => Literal::Str(value.clone()),
        Constant::Class(ty) => Literal::Type(ty.clone()),
    }
}

fn allocated_type(allocation: &Value) -> Type {
    match allocation {
        Value::NewArray { element, .. } => Type::array_of(element.clone()),
        Value::New(ty) | Value::NewMultiArray { ty, .. } => ty.clone(),
        _ => Type::Null,
    }
}
