//! # cfglift Prelude
//!
//! The types needed to build instruction streams, translate them and inspect the result.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cfglift operations
pub use crate::Error;

/// The result type used throughout cfglift
pub use crate::Result;

/// Translation configuration
pub use crate::TranslatorConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Resolution cache and translation driver
pub use crate::program::{ArrayClass, Program};

/// Per-body translation without installation
pub use crate::translator::translate_body;

// ================================================================================================
// Input
// ================================================================================================

/// Instruction stream model
pub use crate::input::{
    Body, BodyBuilder, Constant, InstrId, Instruction, InstructionKind, InvokeExpr, InvokeKind,
    Local, LocalId, Value,
};

/// Join detection
pub use crate::input::{PredecessorOracle, UnitGraph};

/// Types, fields and methods
pub use crate::types::{FieldRef, MethodRef, Type};

// ================================================================================================
// Output IR
// ================================================================================================

/// Produced control-flow graph
pub use crate::cfg::{
    BinaryOp, CallTarget, CfgBlock, Edge, Expression, Literal, Method, MethodBody, MethodRc,
    SourceLocation, Statement, StatementKind, UnaryOp, Variable, VariableKind, VariableRc,
};

/// Graph identifiers
pub use crate::utils::graph::{EdgeId, NodeId};

// ================================================================================================
// Extension Points
// ================================================================================================

/// Heap models and call idioms
pub use crate::translator::{
    CallMatcher, CallSite, FieldHeapModel, IdiomKind, IdiomTable, MemoryModel, MethodInfo,
};

/// Diagnostics
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
