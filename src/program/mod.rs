//! The whole-program model: resolution cache and translation entry points.
//!
//! A [`Program`] lives for one whole-program translation run. It hands out the single
//! [`Method`] instance per signature, the single [`ArrayClass`] per array element type and
//! the single global [`Variable`] per heap map or static field, no matter how many method
//! bodies ask for them or from how many threads.
//!
//! # Thread Safety
//!
//! All caches are `DashMap`s with `entry().or_insert_with()` lookups: the first writer
//! creates the value, every concurrent or later caller receives a clone of the same `Arc`.
//! [`Program::translate_all`] relies on this to translate bodies in parallel.
//!
//! # Example
//!
//! ```rust
//! use cfglift::prelude::*;
//!
//! let mut b = BodyBuilder::new(MethodRef::new("A", "one", vec![], Type::Int));
//! b.ret(Value::int(1));
//! let body = b.finish()?;
//!
//! let program = Program::new();
//! let method = program.translate_with_unit_graph(&body)?;
//! let cfg = method.body().expect("translated");
//! assert_eq!(cfg.block_count(), 2);
//! # Ok::<(), cfglift::Error>(())
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;

use crate::{
    cfg::{Method, MethodRc, Variable, VariableKind, VariableRc},
    config::TranslatorConfig,
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    error::ErrorSite,
    input::{Body, PredecessorOracle, UnitGraph},
    translator::{self, FieldHeapModel, IdiomTable, MemoryModel},
    types::{FieldRef, MethodRef, Type},
    Result,
};

/// Synthetic class standing for all arrays of one element type.
///
/// Arrays have no declared fields; their length is modelled as the field
/// [`length_field`](ArrayClass::length_field) of this class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayClass {
    /// Name of the class, the rendered array type, e.g. `int[]`
    pub name: String,
    /// Element type
    pub element: Type,
    /// The synthetic `int` length field
    pub length_field: FieldRef,
}

/// Shared handle to an [`ArrayClass`].
pub type ArrayClassRc = Arc<ArrayClass>;

/// Resolution cache and translation driver for one program.
pub struct Program {
    methods: DashMap<String, MethodRc>,
    array_classes: DashMap<Type, ArrayClassRc>,
    globals: DashMap<String, VariableRc>,
    config: TranslatorConfig,
    idioms: IdiomTable,
    memory: Box<dyn MemoryModel>,
    diagnostics: Arc<Diagnostics>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// A program with the default configuration and the field-split heap model.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TranslatorConfig::default())
    }

    /// A program with the given configuration.
    #[must_use]
    pub fn with_config(config: TranslatorConfig) -> Self {
        Self::with_memory_model(config, FieldHeapModel::new())
    }

    /// A program with the given configuration and heap model.
    #[must_use]
    pub fn with_memory_model(config: TranslatorConfig, memory: impl MemoryModel + 'static) -> Self {
        Program {
            methods: DashMap::new(),
            array_classes: DashMap::new(),
            globals: DashMap::new(),
            idioms: IdiomTable::from_config(&config),
            config,
            memory: Box::new(memory),
            diagnostics: Arc::new(Diagnostics::new()),
        }
    }

    /// The translation configuration.
    #[must_use]
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Non-fatal findings of all translations so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// The call-idiom table built from the configuration.
    #[must_use]
    pub fn idioms(&self) -> &IdiomTable {
        &self.idioms
    }

    /// The heap model.
    #[must_use]
    pub fn memory_model(&self) -> &dyn MemoryModel {
        self.memory.as_ref()
    }

    /// The unique [`Method`] for `method_ref`, created on first request.
    pub fn resolve_method(&self, method_ref: &MethodRef) -> MethodRc {
        self.methods
            .entry(method_ref.signature())
            .or_insert_with(|| Arc::new(Method::new(method_ref.clone())))
            .clone()
    }

    /// The method with `signature`, if it was ever resolved.
    #[must_use]
    pub fn lookup_method(&self, signature: &str) -> Option<MethodRc> {
        self.methods.get(signature).map(|entry| entry.value().clone())
    }

    /// All resolved methods, in no particular order.
    #[must_use]
    pub fn methods(&self) -> Vec<MethodRc> {
        self.methods.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of resolved methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// The synthetic class of arrays of `element`.
    pub fn array_class(&self, element: &Type) -> ArrayClassRc {
        self.array_classes
            .entry(element.clone())
            .or_insert_with(|| {
                let name = Type::array_of(element.clone()).to_string();
                Arc::new(ArrayClass {
                    length_field: FieldRef::new(&name, &self.config.length_field_name, Type::Int),
                    name,
                    element: element.clone(),
                })
            })
            .clone()
    }

    /// Number of synthetic array classes.
    #[must_use]
    pub fn array_class_count(&self) -> usize {
        self.array_classes.len()
    }

    /// The program-wide variable `name`, created with type `ty` on first request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvariantViolation`] if `name` already exists with a type
    /// other than `ty`.
    pub fn global(&self, name: &str, ty: Type) -> Result<VariableRc> {
        let existing = self.globals.get(name).map(|entry| entry.value().clone());
        let global = match existing {
            Some(global) => global,
            None => self
                .globals
                .entry(name.to_string())
                .or_insert_with(|| Variable::new(name, ty.clone(), VariableKind::Global))
                .clone(),
        };

        if global.ty() != &ty {
            return Err(invariant_error!(
                ErrorSite::none(),
                "global {} requested as {}, already declared as {}",
                name,
                ty,
                global.ty()
            ));
        }
        Ok(global)
    }

    /// Number of program-wide variables.
    #[must_use]
    pub fn global_count(&self) -> usize {
        self.globals.len()
    }

    /// The synthetic field holding every object's allocation-time type.
    #[must_use]
    pub fn type_field(&self) -> FieldRef {
        FieldRef::new(
            &self.config.root_class,
            &self.config.type_field_name,
            Type::class(&self.config.class_type),
        )
    }

    /// Translates `body` and installs the result into its [`Method`].
    ///
    /// `oracle` reports the predecessor counts used to find join points.
    ///
    /// # Errors
    ///
    /// Returns the fatal translation errors ([`crate::Error::Structural`],
    /// [`crate::Error::InvariantViolation`], [`crate::Error::Unsupported`]) and
    /// [`crate::Error::BodyAlreadyTranslated`] if this method already has a body.
    pub fn translate(&self, body: &Body, oracle: &dyn PredecessorOracle) -> Result<MethodRc> {
        let method = self.resolve_method(&body.signature);
        let translated = translator::translate_body(self, body, oracle)?;
        method.install(translated)?;
        Ok(method)
    }

    /// [`Self::translate`] with predecessor counts from a [`UnitGraph`] of `body`.
    ///
    /// # Errors
    ///
    /// See [`Self::translate`].
    pub fn translate_with_unit_graph(&self, body: &Body) -> Result<MethodRc> {
        let graph = UnitGraph::new(body)?;
        self.translate(body, &graph)
    }

    /// Translates independent bodies in parallel.
    ///
    /// Results are in input order. A body that fails is skipped: its error is returned in
    /// its slot and recorded as an error diagnostic; the others are unaffected.
    pub fn translate_all(&self, bodies: &[Body]) -> Vec<Result<MethodRc>> {
        bodies
            .par_iter()
            .map(|body| {
                let result = self.translate_with_unit_graph(body);
                if let Err(error) = &result {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Error,
                            DiagnosticCategory::General,
                            format!("method skipped: {error}"),
                        )
                        .with_method(body.signature.signature()),
                    );
                }
                result
            })
            .collect()
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("methods", &self.methods.len())
            .field("array_classes", &self.array_classes.len())
            .field("globals", &self.globals.len())
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::Error;

    #[test]
    fn test_resolve_method_is_idempotent() {
        let program = Program::new();
        let m = MethodRef::new("A", "f", vec![Type::Int], Type::Void);

        let first = program.resolve_method(&m);
        let second = program.resolve_method(&m.clone());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(program.method_count(), 1);
        assert!(program.lookup_method("<A: void f(int)>").is_some());
        assert!(program.lookup_method("<A: void g()>").is_none());
    }

    #[test]
    fn test_concurrent_resolution_converges() {
        let program = Arc::new(Program::new());
        let m = MethodRef::new("A", "shared", vec![], Type::Int);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let program = Arc::clone(&program);
                let m = m.clone();
                thread::spawn(move || program.resolve_method(&m))
            })
            .collect();
        let resolved: Vec<MethodRc> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(resolved.iter().all(|r| Arc::ptr_eq(r, &resolved[0])));
        assert_eq!(program.method_count(), 1);
    }

    #[test]
    fn test_array_classes() {
        let program = Program::new();
        let ints = program.array_class(&Type::Int);
        assert_eq!(ints.name, "int[]");
        assert_eq!(ints.length_field.qualified_name(), "int[].$length");
        assert!(Arc::ptr_eq(&ints, &program.array_class(&Type::Int)));
        program.array_class(&Type::class("A"));
        assert_eq!(program.array_class_count(), 2);
    }

    #[test]
    fn test_globals_are_shared() {
        let program = Program::new();
        let a = program.global("A.x", Type::Int).unwrap();
        let b = program.global("A.x", Type::Int).unwrap();
        assert_eq!(a, b);
        assert!(a.is_global());
        assert_eq!(program.global_count(), 1);
    }

    #[test]
    fn test_global_type_conflict() {
        let program = Program::new();
        program.global("A.x", Type::Int).unwrap();

        match program.global("A.x", Type::Long) {
            Err(Error::InvariantViolation { message, .. }) => {
                assert_eq!(message, "global A.x requested as long, already declared as int");
            }
            other => panic!("expected invariant violation, got {other:?}"),
        }
        assert_eq!(program.global_count(), 1);
    }

    #[test]
    fn test_type_field() {
        let program = Program::with_config(
            TranslatorConfig::default().with_synthetic_fields("$type", "$len"),
        );
        let field = program.type_field();
        assert_eq!(field.qualified_name(), "java.lang.Object.$type");
        assert_eq!(field.ty, Type::class("java.lang.Class"));
    }
}
