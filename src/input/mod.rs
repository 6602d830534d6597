//! The normalized instruction stream consumed by translation.
//!
//! A front-end hands over one [`Body`] per method: a flat list of three-address
//! [`Instruction`]s whose operands are [`Value`] trees, plus declared locals. Exceptional
//! control flow, switches and subroutines are expected to have been removed beforehand;
//! the translator rejects what is left of them.
//!
//! # Key Components
//!
//! - [`Body`] / [`Instruction`] / [`InstructionKind`] - the stream
//! - [`Value`] / [`InvokeExpr`] / [`Constant`] - operand trees
//! - [`PredecessorOracle`] / [`UnitGraph`] - join detection
//! - [`BodyBuilder`] - label-based construction for front-ends and tests

mod body;
mod builder;
mod instruction;
mod oracle;
mod value;

pub use body::{Body, Local};
pub use builder::BodyBuilder;
pub use instruction::{InstrId, Instruction, InstructionKind};
pub use oracle::{PredecessorOracle, UnitGraph};
pub use value::{Constant, InvokeExpr, InvokeKind, LocalId, Value};
