//! Translation configuration.
//!
//! [`TranslatorConfig`] names the library methods the call-idiom table recognizes and the
//! synthetic names the memory model introduces. The defaults target the standard library of
//! the managed runtime the instruction streams come from; a front-end that renames runtime
//! classes (or wants a different assertion entry point) overrides them here.

/// Configuration for a whole-program translation run.
///
/// Signatures use the rendered form produced by [`crate::types::MethodRef::signature`],
/// e.g. `<java.lang.String: int length()>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Assertion entry point lowered to an `assert` statement.
    pub assert_method: String,

    /// String length query lowered to a read of the synthetic length field.
    pub string_length_signature: String,

    /// Process exit; translation of the current block stops at the call.
    pub exit_signature: String,

    /// Substring identifying the test framework's assertion class.
    pub test_framework_class: String,

    /// Name of the unconditional-failure method on [`Self::test_framework_class`].
    pub test_failure_method: String,

    /// Prefix of the precondition-check utility classes.
    pub precondition_class_prefix: String,

    /// Sub-signature of the boolean precondition check on those classes.
    pub precondition_signature: String,

    /// Runtime type-assignability query.
    pub assignable_signature: String,

    /// Query returning the runtime type of its receiver.
    pub get_class_signature: String,

    /// Checked cast through the runtime type object.
    pub cast_signature: String,

    /// Instance-of query through the runtime type object.
    pub is_instance_signature: String,

    /// Class every object and array inherits from; holds the type-tag field.
    pub root_class: String,

    /// Class of runtime type objects.
    pub class_type: String,

    /// Class whose instances answer [`Self::string_length_signature`].
    pub string_class: String,

    /// Name of the synthetic field recording an object's allocation-time type.
    pub type_field_name: String,

    /// Name of the synthetic length field on strings and array classes.
    pub length_field_name: String,

    /// Report indirect invocations as [`crate::Error::Unsupported`] instead of a diagnostic.
    pub strict_unsupported: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            assert_method: "<cfglift.Assertions: void check(boolean)>".to_string(),
            string_length_signature: "<java.lang.String: int length()>".to_string(),
            exit_signature: "<java.lang.System: void exit(int)>".to_string(),
            test_framework_class: "org.junit.Assert".to_string(),
            test_failure_method: "fail".to_string(),
            precondition_class_prefix: "com.google.common.base.".to_string(),
            precondition_signature: "void checkArgument(boolean)".to_string(),
            assignable_signature: "<java.lang.Class: boolean isAssignableFrom(java.lang.Class)>"
                .to_string(),
            get_class_signature: "<java.lang.Object: java.lang.Class getClass()>".to_string(),
            cast_signature: "<java.lang.Class: java.lang.Object cast(java.lang.Object)>"
                .to_string(),
            is_instance_signature: "<java.lang.Class: boolean isInstance(java.lang.Object)>"
                .to_string(),
            root_class: "java.lang.Object".to_string(),
            class_type: "java.lang.Class".to_string(),
            string_class: "java.lang.String".to_string(),
            type_field_name: "$dynamicType".to_string(),
            length_field_name: "$length".to_string(),
            strict_unsupported: false,
        }
    }
}

impl TranslatorConfig {
    /// Default configuration with unsound lowerings turned into errors.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_unsupported: true,
            ..Self::default()
        }
    }

    /// Sets the assertion entry point.
    #[must_use]
    pub fn with_assert_method(mut self, signature: impl Into<String>) -> Self {
        self.assert_method = signature.into();
        self
    }

    /// Sets the root class carrying the type-tag field.
    #[must_use]
    pub fn with_root_class(mut self, class: impl Into<String>) -> Self {
        self.root_class = class.into();
        self
    }

    /// Renames the synthetic type-tag and length fields.
    #[must_use]
    pub fn with_synthetic_fields(
        mut self,
        type_field: impl Into<String>,
        length_field: impl Into<String>,
    ) -> Self {
        self.type_field_name = type_field.into();
        self.length_field_name = length_field.into();
        self
    }

    /// Enables or disables strict handling of unsound lowerings.
    #[must_use]
    pub fn with_strict_unsupported(mut self, strict: bool) -> Self {
        self.strict_unsupported = strict;
        self
    }
}
