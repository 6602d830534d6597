//! Source positions attached to instructions and statements.

use std::{fmt, sync::Arc};

/// Where an instruction came from in the original program.
///
/// Both parts are optional: bytecode without debug information has neither file nor line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file name
    pub file: Option<Arc<str>>,
    /// 1-based line number
    pub line: Option<u32>,
}

impl SourceLocation {
    /// Creates a location with both file and line.
    #[must_use]
    pub fn new(file: impl AsRef<str>, line: u32) -> Self {
        SourceLocation {
            file: Some(Arc::from(file.as_ref())),
            line: Some(line),
        }
    }

    /// Creates a location that only knows the line.
    #[must_use]
    pub fn line(line: u32) -> Self {
        SourceLocation {
            file: None,
            line: Some(line),
        }
    }

    /// Returns true if neither file nor line is known.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.file.is_none() && self.line.is_none()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}"),
            (Some(file), None) => write!(f, "{file}"),
            (None, Some(line)) => write!(f, "line {line}"),
            (None, None) => write!(f, "<unknown>"),
        }
    }
}
