//! Translation of instruction streams into control-flow graphs.
//!
//! # Architecture
//!
//! - [`MethodInfo`] - the block builder: instruction-to-block mapping, edges, variables
//! - the instruction translator - one forward pass deciding block membership and lowering
//!   each instruction kind (see `precheck` in the source of [`translate_body`])
//! - [`IdiomTable`] - ordered library-call idioms tried before generic call translation
//! - [`MemoryModel`] - lowering of field and array accesses, [`FieldHeapModel`] by default
//!
//! Translation of one body never touches another body's state; everything shared lives in
//! the [`Program`](crate::program::Program) and is safe to use from several threads.

mod idioms;
mod info;
mod memory;
mod stmt;
mod value;

pub use idioms::{
    CallMatcher, CallSite, Idiom, IdiomKind, IdiomTable, MemberMatcher, SignatureMatcher,
};
pub use info::MethodInfo;
pub use memory::{FieldHeapModel, MemoryModel};

use crate::{
    cfg::MethodBody,
    input::{Body, PredecessorOracle},
    program::Program,
    Result,
};

/// Translates one body without installing it anywhere.
///
/// Most callers want [`Program::translate`], which also attaches the result to the
/// method's shared [`crate::cfg::Method`].
///
/// # Errors
///
/// Returns [`crate::Error::Structural`] for instructions that must have been removed before
/// translation, [`crate::Error::InvariantViolation`] for malformed input and
/// [`crate::Error::Unsupported`] for indirect calls under
/// [`crate::TranslatorConfig::strict_unsupported`].
pub fn translate_body(
    program: &Program,
    body: &Body,
    oracle: &dyn PredecessorOracle,
) -> Result<MethodBody> {
    let info = stmt::StmtTranslator::new(program, body, oracle).run()?;
    Ok(info.finish())
}
