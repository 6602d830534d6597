//! Helper functions for building bodies and translating them in unit tests.

use crate::{
    cfg::{MethodBody, SourceLocation},
    input::{
        Body, BodyBuilder, Instruction, InstructionKind, Local, LocalId, UnitGraph, Value,
    },
    program::Program,
    translator::translate_body,
    types::{MethodRef, Type},
    Result,
};

// Helper function to create a static void method reference
pub fn void_method(name: &str) -> MethodRef {
    MethodRef::new("Test", name, vec![], Type::Void)
}

// Helper function to create a builder for a static method
pub fn builder(name: &str, params: Vec<Type>, return_type: Type) -> BodyBuilder {
    BodyBuilder::new(MethodRef::new("Test", name, params, return_type))
}

// Helper function to create `x = 0; x = 1; ...` with `count` assignments to one int local
pub fn straight_body(count: usize) -> Body {
    let mut body = Body::new(void_method("straight"), true);
    body.locals.push(Local {
        name: "x".to_string(),
        ty: Type::Int,
    });
    for i in 0..count {
        let value = i32::try_from(i).unwrap_or(i32::MAX);
        body.instructions.push(Instruction::new(
            InstructionKind::Assign {
                lhs: Value::local(LocalId::new(0)),
                rhs: Value::int(value),
            },
            SourceLocation::line(u32::try_from(i + 1).unwrap_or(u32::MAX)),
        ));
    }
    body
}

// Helper function to translate a body with a fresh program and unit-graph predecessors
pub fn translate(body: &Body) -> Result<MethodBody> {
    translate_with(&Program::new(), body)
}

// Helper function to translate a body against an existing program
pub fn translate_with(program: &Program, body: &Body) -> Result<MethodBody> {
    translate_body(program, body, &UnitGraph::new(body)?)
}

// Helper function to render every statement of a body in block order
pub fn statements(body: &MethodBody) -> Vec<String> {
    body.statements()
        .map(|(_, statement)| statement.to_string())
        .collect()
}
