//! Diagnostics collection for method translation.
//!
//! Translation of a method either succeeds or fails with a fatal [`crate::Error`]. Between
//! those two outcomes sit findings that do not stop translation but weaken the result: an
//! indirect invocation lowered to an opaque call, a monitor region whose synchronization is
//! not modelled, a method body skipped during a whole-program run. Those are collected here.
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for lock-free append, so parallel
//! per-method translations running under [`crate::Program::translate_all`] can report into
//! one shared collector without synchronization.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`DiagnosticCategory`] - Which part of the translation reported it
//!
//! # Usage Examples
//!
//! ```rust
//! use cfglift::diagnostics::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.warning(DiagnosticCategory::Call, "dynamic invocation lowered to an opaque call");
//!
//! assert!(diagnostics.has_warnings());
//! for entry in diagnostics.iter() {
//!     println!("{entry}");
//! }
//! ```

use std::fmt::{self, Write};

use crate::cfg::SourceLocation;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for constructs that are translated but only approximately modelled.
    Info,

    /// The translated method is knowingly unsound at this point.
    Warning,

    /// A method could not be translated at all.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating which part of the translation produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Call translation: indirect invocation, unmodelled library idioms.
    Call,

    /// Heap and array access lowering.
    Memory,

    /// Monitor enter/exit and synchronized methods.
    Monitor,

    /// Runtime type queries and type tags.
    Type,

    /// Control-flow truncation such as process exit.
    Control,

    /// Anything else, including methods skipped after a fatal error.
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Call => write!(f, "Call"),
            DiagnosticCategory::Memory => write!(f, "Memory"),
            DiagnosticCategory::Monitor => write!(f, "Monitor"),
            DiagnosticCategory::Type => write!(f, "Type"),
            DiagnosticCategory::Control => write!(f, "Control"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Signature of the method being translated, if any.
    pub method: Option<String>,

    /// Source position of the instruction that triggered the diagnostic.
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            method: None,
            location: None,
        }
    }

    /// Attaches the signature of the method under translation.
    #[must_use]
    pub fn with_method(mut self, signature: impl Into<String>) -> Self {
        self.method = Some(signature.into());
        self
    }

    /// Attaches a source location.
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(method) = &self.method {
            write!(f, " (method: {method})")?;
        }

        if let Some(location) = &self.location {
            write!(f, " (at {location})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that carry a method signature or a source location.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.any_with(DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.any_with(DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Warning)
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Info)
    }

    /// Returns an iterator over all diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.with_severity(DiagnosticSeverity::Error)
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.with_severity(DiagnosticSeverity::Warning)
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Returns diagnostics reported while translating the method with the given signature.
    pub fn for_method(&self, signature: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.method.as_deref() == Some(signature))
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    ///
    /// Errors and warnings are listed individually, infos are only counted.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();
        let info_count = self.info_count();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            error_count, warning_count, info_count
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }

    fn any_with(&self, severity: DiagnosticSeverity) -> bool {
        self.iter().any(|d| d.severity == severity)
    }

    fn count_with(&self, severity: DiagnosticSeverity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }

    fn with_severity(&self, severity: DiagnosticSeverity) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.severity == severity).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::Call,
            "Test message",
        );

        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.category, DiagnosticCategory::Call);
        assert_eq!(diag.message, "Test message");
        assert!(diag.method.is_none());
        assert!(diag.location.is_none());
    }

    #[test]
    fn test_diagnostic_with_context() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Info,
            DiagnosticCategory::Monitor,
            "monitor region",
        )
        .with_method("<A: void run()>")
        .with_location(SourceLocation::new("A.java", 12));

        assert_eq!(diag.method.as_deref(), Some("<A: void run()>"));
        assert_eq!(diag.location.and_then(|l| l.line), Some(12));
    }

    #[test]
    fn test_diagnostics_container() {
        let diagnostics = Diagnostics::new();

        diagnostics.info(DiagnosticCategory::General, "Info message");
        diagnostics.warning(DiagnosticCategory::Call, "Warning message");
        diagnostics.error(DiagnosticCategory::General, "Error message");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.info_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert!(diagnostics.has_any());
    }

    #[test]
    fn test_diagnostics_thread_safety() {
        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = vec![];

        for i in 0..10 {
            let diag_clone = Arc::clone(&diagnostics);
            handles.push(thread::spawn(move || {
                diag_clone.warning(DiagnosticCategory::Call, format!("Thread {} warning", i));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 10);
    }

    #[test]
    fn test_diagnostics_by_category_and_method() {
        let diagnostics = Diagnostics::new();

        diagnostics.push(
            Diagnostic::new(DiagnosticSeverity::Warning, DiagnosticCategory::Call, "a")
                .with_method("<A: void f()>"),
        );
        diagnostics.push(
            Diagnostic::new(DiagnosticSeverity::Info, DiagnosticCategory::Monitor, "b")
                .with_method("<A: void g()>"),
        );
        diagnostics.info(DiagnosticCategory::Monitor, "c");

        assert_eq!(diagnostics.by_category(DiagnosticCategory::Monitor).len(), 2);
        assert_eq!(diagnostics.for_method("<A: void f()>").len(), 1);
        assert!(diagnostics.for_method("<A: void h()>").is_empty());
    }

    #[test]
    fn test_diagnostics_summary() {
        let diagnostics = Diagnostics::new();
        diagnostics.error(DiagnosticCategory::General, "skipped <A: void f()>");
        diagnostics.info(DiagnosticCategory::Monitor, "not listed");

        let summary = diagnostics.summary();
        assert!(summary.contains("1 error(s), 0 warning(s), 1 info(s)"));
        assert!(summary.contains("[ERROR] General: skipped <A: void f()>"));
        assert!(!summary.contains("not listed"));
    }
}
