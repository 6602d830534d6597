// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]

//! # cfglift
//!
//! Lifts normalized three-address instruction streams of a managed-runtime program into an
//! explicit control-flow-graph IR for verification back-ends.
//!
//! Each method body arrives as a flat list of instructions with position-based jumps. The
//! translator reconstructs blocks and (optionally guarded) edges in one forward pass,
//! lowers field and array accesses through a pluggable heap model, recognizes a fixed table
//! of library-call idioms (assertions, string length, exit, runtime type queries) and
//! resolves every callee to one shared method object per signature.
//!
//! ## Features
//!
//! - **Single-pass block discovery** - join points come from an injected predecessor oracle
//! - **Guarded edges** - both outcomes of a branch carry independent condition trees
//! - **Unique sink** - every returning path ends in one block per method
//! - **Burstall-Bornat heap** - one map per field and one per array element type
//! - **Parallel translation** - thread-safe resolution cache, `rayon` over bodies
//! - **Diagnostics** - unsound lowerings are reported, not hidden
//!
//! ## Quick Start
//!
//! ```rust
//! use cfglift::prelude::*;
//!
//! // int max(int a, int b) { if (a >= b) return a; return b; }
//! let mut b = BodyBuilder::new(MethodRef::new("Demo", "max", vec![Type::Int, Type::Int], Type::Int));
//! let a = b.param("a", 0, Type::Int);
//! let c = b.param("b", 1, Type::Int);
//! b.if_goto(Value::binary(BinaryOp::Ge, a.into(), c.into()), "first");
//! b.ret(c);
//! b.label("first")?;
//! b.ret(a);
//! let body = b.finish()?;
//!
//! let program = Program::new();
//! let method = program.translate_with_unit_graph(&body)?;
//! let cfg = method.body().expect("just translated");
//!
//! // entry, two return blocks and the sink
//! assert_eq!(cfg.block_count(), 4);
//! assert_eq!(cfg.incoming(cfg.sink()).count(), 2);
//! println!("{}", cfg.to_dot(Some(method.signature())));
//! # Ok::<(), cfglift::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`input`] - the instruction stream consumed from the front-end
//! - [`translator`] - block builder, instruction translator, idiom table, heap model
//! - [`cfg`] - the produced IR
//! - [`program`] - resolution cache and translation entry points
//! - [`diagnostics`] - non-fatal findings
//! - [`Error`] and [`Result`] - fatal errors

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cfglift::prelude::*;
///
/// let program = Program::with_config(TranslatorConfig::strict());
/// assert_eq!(program.method_count(), 0);
/// ```
pub mod prelude;

/// The control-flow-graph IR produced by translation.
///
/// # Key Types
///
/// - [`cfg::MethodBody`] - blocks, edges, entry, sink and the method's variables
/// - [`cfg::Statement`] - assignment, assertion, assumption and call
/// - [`cfg::Expression`] - immutable expression trees
pub mod cfg;

/// Translation configuration.
pub mod config;

/// Thread-safe collection of non-fatal findings.
pub mod diagnostics;

/// The normalized instruction stream consumed from the front-end.
pub mod input;

/// The whole-program model: resolution cache and translation entry points.
pub mod program;

/// Translation of instruction streams into control-flow graphs.
pub mod translator;

/// Runtime type model shared by input and output.
pub mod types;

/// Graph arena and helpers.
pub mod utils;

pub use config::TranslatorConfig;
pub use error::Error;
pub use program::Program;

/// `cfglift` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
