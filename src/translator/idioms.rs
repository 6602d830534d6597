//! The call-idiom table.
//!
//! Some library calls have a meaning the verifier understands better than an opaque call:
//! assertions, string length, process exit, runtime type queries. Before a call is
//! translated generically, it is looked up in an ordered [`IdiomTable`] of
//! ([`CallMatcher`], [`IdiomKind`]) pairs. The first matching entry decides the lowering;
//! no match (a lookup miss) means the generic path.
//!
//! # Available Matchers
//!
//! | Matcher | Description |
//! |---------|-------------|
//! | [`SignatureMatcher`] | Exact full signature |
//! | [`MemberMatcher`] | Declaring class substring or prefix, method name, signature substring |

use std::fmt;

use crate::{config::TranslatorConfig, types::MethodRef};

/// What the idiom lookup sees of a call site.
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    /// The resolved callee
    pub method: &'a MethodRef,
    /// `method.signature()`, rendered once
    pub signature: String,
    /// Whether the call's result is stored
    pub has_result: bool,
}

impl<'a> CallSite<'a> {
    /// Describes a call of `method`.
    #[must_use]
    pub fn new(method: &'a MethodRef, has_result: bool) -> Self {
        CallSite {
            method,
            signature: method.signature(),
            has_result,
        }
    }
}

/// Decides whether a table entry applies to a call site.
///
/// Matchers are `Send + Sync` because one table is shared by parallel translations.
pub trait CallMatcher: Send + Sync {
    /// Returns true if the call site matches.
    fn matches(&self, site: &CallSite<'_>) -> bool;

    /// A concise description for debugging, e.g. `signature=<A: void f()>`.
    fn description(&self) -> String;
}

/// Matches one exact signature.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    signature: String,
}

impl SignatureMatcher {
    /// Creates a matcher for `signature`.
    #[must_use]
    pub fn new(signature: impl Into<String>) -> Self {
        SignatureMatcher {
            signature: signature.into(),
        }
    }
}

impl CallMatcher for SignatureMatcher {
    fn matches(&self, site: &CallSite<'_>) -> bool {
        site.signature == self.signature
    }

    fn description(&self) -> String {
        format!("signature={}", self.signature)
    }
}

/// Matches by parts of the callee. Unset parts match anything; all set parts must match.
///
/// # Examples
///
/// ```rust
/// use cfglift::translator::{CallMatcher, CallSite, MemberMatcher};
/// use cfglift::types::{MethodRef, Type};
///
/// let matcher = MemberMatcher::new().class_contains("org.junit.Assert").name("fail");
/// let fail = MethodRef::new("org.junit.Assert", "fail", vec![], Type::Void);
/// assert!(matcher.matches(&CallSite::new(&fail, false)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemberMatcher {
    class_contains: Option<String>,
    class_prefix: Option<String>,
    name: Option<String>,
    signature_contains: Option<String>,
}

impl MemberMatcher {
    /// Creates a matcher that matches every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the declaring class name to contain `part`.
    #[must_use]
    pub fn class_contains(mut self, part: impl Into<String>) -> Self {
        self.class_contains = Some(part.into());
        self
    }

    /// Requires the declaring class name to start with `prefix`.
    #[must_use]
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Requires the method name to be `name`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requires the full signature to contain `part`.
    #[must_use]
    pub fn signature_contains(mut self, part: impl Into<String>) -> Self {
        self.signature_contains = Some(part.into());
        self
    }
}

impl CallMatcher for MemberMatcher {
    fn matches(&self, site: &CallSite<'_>) -> bool {
        let class = &*site.method.class;
        self.class_contains
            .as_deref()
            .is_none_or(|part| class.contains(part))
            && self
                .class_prefix
                .as_deref()
                .is_none_or(|prefix| class.starts_with(prefix))
            && self
                .name
                .as_deref()
                .is_none_or(|name| &*site.method.name == name)
            && self
                .signature_contains
                .as_deref()
                .is_none_or(|part| site.signature.contains(part))
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();
        if let Some(part) = &self.class_contains {
            parts.push(format!("class~{part}"));
        }
        if let Some(prefix) = &self.class_prefix {
            parts.push(format!("class^{prefix}"));
        }
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if let Some(part) = &self.signature_contains {
            parts.push(format!("signature~{part}"));
        }
        if parts.is_empty() {
            "any".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// The specialized lowering of a matched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum IdiomKind {
    /// `assert(arg)`
    Assert,
    /// `result := length(base)` through the memory model
    StringLength,
    /// Ends the current block without an edge
    Exit,
    /// Returns the method's default value
    TestFailure,
    /// `assert(arg)` for precondition utilities
    Precondition,
    /// `result := arg <: base`
    IsAssignableFrom,
    /// `result := typeof(base)`
    GetClass,
    /// `assert(typeof(arg) <: base); result := arg`
    Cast,
    /// `result := typeof(arg) <: base`
    IsInstance,
}

/// One table entry.
pub struct Idiom {
    matcher: Box<dyn CallMatcher>,
    kind: IdiomKind,
    requires_result: bool,
}

impl Idiom {
    /// Creates an entry that applies whether or not the result is used.
    #[must_use]
    pub fn new(matcher: impl CallMatcher + 'static, kind: IdiomKind) -> Self {
        Idiom {
            matcher: Box::new(matcher),
            kind,
            requires_result: false,
        }
    }

    /// Creates an entry that only applies when the call result is stored.
    #[must_use]
    pub fn with_result(matcher: impl CallMatcher + 'static, kind: IdiomKind) -> Self {
        Idiom {
            requires_result: true,
            ..Self::new(matcher, kind)
        }
    }

    /// The lowering this entry selects.
    #[must_use]
    pub fn kind(&self) -> IdiomKind {
        self.kind
    }

    fn applies(&self, site: &CallSite<'_>) -> bool {
        (site.has_result || !self.requires_result) && self.matcher.matches(site)
    }
}

impl fmt::Debug for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Idiom")
            .field("matcher", &self.matcher.description())
            .field("kind", &self.kind)
            .field("requires_result", &self.requires_result)
            .finish()
    }
}

/// Ordered idiom entries; the first applicable one wins.
#[derive(Debug)]
pub struct IdiomTable {
    idioms: Vec<Idiom>,
}

impl IdiomTable {
    /// Builds the standard table from the configured signatures.
    ///
    /// Order: assertion, string length, exit, test failure, precondition, assignability,
    /// get-class, cast, instance-of.
    #[must_use]
    pub fn from_config(config: &TranslatorConfig) -> Self {
        let idioms = vec![
            Idiom::new(
                SignatureMatcher::new(&config.assert_method),
                IdiomKind::Assert,
            ),
            Idiom::new(
                SignatureMatcher::new(&config.string_length_signature),
                IdiomKind::StringLength,
            ),
            Idiom::new(
                SignatureMatcher::new(&config.exit_signature),
                IdiomKind::Exit,
            ),
            Idiom::new(
                MemberMatcher::new()
                    .class_contains(&config.test_framework_class)
                    .name(&config.test_failure_method),
                IdiomKind::TestFailure,
            ),
            Idiom::new(
                MemberMatcher::new()
                    .class_prefix(&config.precondition_class_prefix)
                    .signature_contains(&config.precondition_signature),
                IdiomKind::Precondition,
            ),
            Idiom::with_result(
                SignatureMatcher::new(&config.assignable_signature),
                IdiomKind::IsAssignableFrom,
            ),
            Idiom::with_result(
                SignatureMatcher::new(&config.get_class_signature),
                IdiomKind::GetClass,
            ),
            Idiom::with_result(
                SignatureMatcher::new(&config.cast_signature),
                IdiomKind::Cast,
            ),
            Idiom::with_result(
                SignatureMatcher::new(&config.is_instance_signature),
                IdiomKind::IsInstance,
            ),
        ];

        IdiomTable { idioms }
    }

    /// The lowering for `site`, or `None` for the generic call path.
    #[must_use]
    pub fn lookup(&self, site: &CallSite<'_>) -> Option<IdiomKind> {
        self.idioms
            .iter()
            .find(|idiom| idiom.applies(site))
            .map(Idiom::kind)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.idioms.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idioms.is_empty()
    }

    /// Entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Idiom> {
        self.idioms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn table() -> IdiomTable {
        IdiomTable::from_config(&TranslatorConfig::default())
    }

    fn lookup(method: &MethodRef, has_result: bool) -> Option<IdiomKind> {
        table().lookup(&CallSite::new(method, has_result))
    }

    #[test]
    fn test_exact_signatures() {
        let assert = MethodRef::new("cfglift.Assertions", "check", vec![Type::Boolean], Type::Void);
        let length = MethodRef::new("java.lang.String", "length", vec![], Type::Int);
        let exit = MethodRef::new("java.lang.System", "exit", vec![Type::Int], Type::Void);

        assert_eq!(lookup(&assert, false), Some(IdiomKind::Assert));
        assert_eq!(lookup(&length, true), Some(IdiomKind::StringLength));
        assert_eq!(lookup(&exit, false), Some(IdiomKind::Exit));
    }

    #[test]
    fn test_member_matching() {
        let fail = MethodRef::new(
            "org.junit.Assert",
            "fail",
            vec![Type::class("java.lang.String")],
            Type::Void,
        );
        let check = MethodRef::new(
            "com.google.common.base.Preconditions",
            "checkArgument",
            vec![Type::Boolean],
            Type::Void,
        );
        let other_check = MethodRef::new(
            "org.example.Preconditions",
            "checkArgument",
            vec![Type::Boolean],
            Type::Void,
        );

        assert_eq!(lookup(&fail, false), Some(IdiomKind::TestFailure));
        assert_eq!(lookup(&check, false), Some(IdiomKind::Precondition));
        assert_eq!(lookup(&other_check, false), None);
    }

    #[test]
    fn test_type_queries_need_result() {
        let get_class = MethodRef::new(
            "java.lang.Object",
            "getClass",
            vec![],
            Type::class("java.lang.Class"),
        );
        assert_eq!(lookup(&get_class, true), Some(IdiomKind::GetClass));
        assert_eq!(lookup(&get_class, false), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Configure the assertion method to also look like a precondition check.
        let config = TranslatorConfig::default()
            .with_assert_method("<com.google.common.base.Checks: void checkArgument(boolean)>");
        let table = IdiomTable::from_config(&config);
        let method = MethodRef::new(
            "com.google.common.base.Checks",
            "checkArgument",
            vec![Type::Boolean],
            Type::Void,
        );
        assert_eq!(
            table.lookup(&CallSite::new(&method, false)),
            Some(IdiomKind::Assert)
        );
    }

    #[test]
    fn test_table_shape() {
        let table = table();
        assert_eq!(table.len(), 9);
        assert!(!table.is_empty());
        let kinds: Vec<_> = table.iter().map(Idiom::kind).collect();
        assert_eq!(kinds.first(), Some(&IdiomKind::Assert));
        assert_eq!(kinds.last(), Some(&IdiomKind::IsInstance));
        assert_eq!(
            MemberMatcher::new().name("fail").class_prefix("org.").description(),
            "class^org., name=fail"
        );
        assert_eq!(MemberMatcher::new().description(), "any");
    }

    #[test]
    fn test_unknown_call_misses() {
        let method = MethodRef::new("A", "run", vec![], Type::Void);
        assert_eq!(lookup(&method, false), None);
    }
}
