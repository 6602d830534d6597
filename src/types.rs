//! Runtime type model shared by the instruction stream and the produced CFG.
//!
//! Types, field references and method references arrive already resolved from the
//! front-end: virtual dispatch has been settled and every field/array access knows its
//! declared type. This module only describes them; it does not model the class hierarchy.

use std::{fmt, sync::Arc};

/// A type of the managed runtime, plus the synthetic map type used for heap variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// No value (method return type only)
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// Type of the `null` constant
    Null,
    /// A class or interface, by fully qualified name
    Class(Arc<str>),
    /// An array with the given element type
    Array(Box<Type>),
    /// A total map from key tuples to values; the type of a heap variable
    Map {
        /// Key component types
        keys: Vec<Type>,
        /// Value type
        value: Box<Type>,
    },
}

impl Type {
    /// Creates a class type.
    #[must_use]
    pub fn class(name: impl AsRef<str>) -> Self {
        Type::Class(Arc::from(name.as_ref()))
    }

    /// Creates an array type with the given element type.
    #[must_use]
    pub fn array_of(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Returns true for class, array and null types.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::Null)
    }

    /// Returns true for [`Type::Void`].
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Returns the element type of an array type.
    #[must_use]
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Boolean => write!(f, "boolean"),
            Type::Byte => write!(f, "byte"),
            Type::Char => write!(f, "char"),
            Type::Short => write!(f, "short"),
            Type::Int => write!(f, "int"),
            Type::Long => write!(f, "long"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::Null => write!(f, "null_type"),
            Type::Class(name) => write!(f, "{name}"),
            Type::Array(element) => write!(f, "{element}[]"),
            Type::Map { keys, value } => {
                write!(f, "[")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{key}")?;
                }
                write!(f, "]{value}")
            }
        }
    }
}

/// A resolved field: declaring class, name and declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Fully qualified name of the declaring class
    pub class: Arc<str>,
    /// Field name
    pub name: Arc<str>,
    /// Declared type of the field
    pub ty: Type,
}

impl FieldRef {
    /// Creates a field reference.
    #[must_use]
    pub fn new(class: impl AsRef<str>, name: impl AsRef<str>, ty: Type) -> Self {
        FieldRef {
            class: Arc::from(class.as_ref()),
            name: Arc::from(name.as_ref()),
            ty,
        }
    }

    /// `Class.field`, unique per field and used to name heap variables.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.class, self.ty, self.name)
    }
}

/// A resolved method reference.
///
/// Its [`signature`](MethodRef::signature) is the key of the program-wide method cache and
/// what the call-idiom table matches against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Fully qualified name of the declaring class
    pub class: Arc<str>,
    /// Method name
    pub name: Arc<str>,
    /// Parameter types, excluding the receiver
    pub params: Vec<Type>,
    /// Return type
    pub return_type: Type,
}

impl MethodRef {
    /// Creates a method reference.
    #[must_use]
    pub fn new(
        class: impl AsRef<str>,
        name: impl AsRef<str>,
        params: Vec<Type>,
        return_type: Type,
    ) -> Self {
        MethodRef {
            class: Arc::from(class.as_ref()),
            name: Arc::from(name.as_ref()),
            params,
            return_type,
        }
    }

    /// The signature without the declaring class: `int length()`.
    #[must_use]
    pub fn sub_signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("{} {}({})", self.return_type, self.name, params.join(","))
    }

    /// The full signature: `<java.lang.String: int length()>`.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("<{}: {}>", self.class, self.sub_signature())
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::class("java.lang.String").to_string(), "java.lang.String");
        assert_eq!(
            Type::array_of(Type::array_of(Type::Int)).to_string(),
            "int[][]"
        );
        let map = Type::Map {
            keys: vec![Type::class("A"), Type::Int],
            value: Box::new(Type::Long),
        };
        assert_eq!(map.to_string(), "[A,int]long");
    }

    #[test]
    fn test_type_queries() {
        assert!(Type::class("A").is_reference());
        assert!(Type::array_of(Type::Int).is_reference());
        assert!(!Type::Int.is_reference());
        assert!(Type::Void.is_void());
        assert_eq!(Type::array_of(Type::Char).element_type(), Some(&Type::Char));
        assert_eq!(Type::Int.element_type(), None);
    }

    #[test]
    fn test_method_signature() {
        let length = MethodRef::new("java.lang.String", "length", vec![], Type::Int);
        assert_eq!(length.signature(), "<java.lang.String: int length()>");

        let assignable = MethodRef::new(
            "java.lang.Class",
            "isAssignableFrom",
            vec![Type::class("java.lang.Class")],
            Type::Boolean,
        );
        assert_eq!(
            assignable.signature(),
            "<java.lang.Class: boolean isAssignableFrom(java.lang.Class)>"
        );

        let two = MethodRef::new("A", "f", vec![Type::Int, Type::array_of(Type::Byte)], Type::Void);
        assert_eq!(two.sub_signature(), "void f(int,byte[])");
    }

    #[test]
    fn test_field_ref() {
        let field = FieldRef::new("A", "count", Type::Int);
        assert_eq!(field.qualified_name(), "A.count");
        assert_eq!(field.to_string(), "<A: int count>");
    }
}
