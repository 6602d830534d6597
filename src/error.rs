use thiserror::Error;

use crate::cfg::SourceLocation;

/// Builds an [`Error::Structural`] for the instruction described by an [`ErrorSite`].
macro_rules! structural_error {
    // Single string version
    ($site:expr, $msg:expr) => {{
        let site: crate::error::ErrorSite = $site;
        crate::Error::Structural {
            message: $msg.to_string(),
            instruction: site.instruction,
            location: site.location,
        }
    }};

    // Format string with arguments version
    ($site:expr, $fmt:expr, $($arg:tt)*) => {{
        let site: crate::error::ErrorSite = $site;
        crate::Error::Structural {
            message: format!($fmt, $($arg)*),
            instruction: site.instruction,
            location: site.location,
        }
    }};
}

/// Builds an [`Error::InvariantViolation`], recording where in this crate it was detected.
macro_rules! invariant_error {
    // Single string version
    ($site:expr, $msg:expr) => {{
        let site: crate::error::ErrorSite = $site;
        crate::Error::InvariantViolation {
            message: $msg.to_string(),
            instruction: site.instruction,
            location: site.location,
            file: file!(),
            line: line!(),
        }
    }};

    // Format string with arguments version
    ($site:expr, $fmt:expr, $($arg:tt)*) => {{
        let site: crate::error::ErrorSite = $site;
        crate::Error::InvariantViolation {
            message: format!($fmt, $($arg)*),
            instruction: site.instruction,
            location: site.location,
            file: file!(),
            line: line!(),
        }
    }};
}

/// The instruction a fatal error is attributed to.
///
/// `instruction` is the rendered `#<index>: <text>` form of the offending instruction,
/// or `<none>` when the error was raised outside of any instruction.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorSite {
    pub instruction: String,
    pub location: SourceLocation,
}

impl ErrorSite {
    pub(crate) fn none() -> Self {
        ErrorSite {
            instruction: "<none>".to_string(),
            location: SourceLocation::default(),
        }
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Fatal translation errors
/// - [`Error::Structural`] - an instruction kind that upstream normalization must have removed
/// - [`Error::InvariantViolation`] - a condition that cannot happen for well-formed input
///   (duplicate edges, field references on both sides of an assignment, ...)
/// - [`Error::Unsupported`] - an unsound lowering, only raised with
///   [`crate::TranslatorConfig::strict_unsupported`] set
///
/// All three identify the offending instruction and its source location.
///
/// ## Program model errors
/// - [`Error::BodyAlreadyTranslated`] - a method received a second translated body
/// - [`Error::UndefinedLabel`] / [`Error::DuplicateLabel`] - [`crate::input::BodyBuilder`] label resolution
/// - [`Error::GraphError`] - graph arena misuse
///
/// # Examples
///
/// ```rust
/// use cfglift::prelude::*;
///
/// let mut builder = BodyBuilder::new(MethodRef::new("Demo", "run", vec![], Type::Void));
/// builder.push(InstructionKind::Ret(LocalId::new(0)));
/// let body = builder.finish()?;
///
/// let program = Program::new();
/// match program.translate_with_unit_graph(&body) {
///     Err(Error::Structural { message, instruction, location }) => {
///         eprintln!("{location} {instruction}: {message}");
///     }
///     other => panic!("unexpected: {other:?}"),
/// }
/// # Ok::<(), cfglift::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An instruction kind that upstream normalization is required to eliminate was encountered.
    ///
    /// Multi-way switches, subroutine returns and throws never reach the translator in a
    /// correct pipeline; seeing one means an earlier pass did not run or failed.
    #[error("Structural - {location} {instruction}: {message}")]
    Structural {
        /// What was wrong with the instruction
        message: String,
        /// The rendered instruction, `#<index>: <text>`
        instruction: String,
        /// Source position of the instruction
        location: SourceLocation,
    },

    /// A defensive check failed.
    ///
    /// These indicate a bug in an upstream pass (or in this crate) and are never silently
    /// repaired. The crate source position that detected the violation is included.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `instruction` - The rendered instruction being translated
    /// * `location` - Source position of that instruction
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Invariant violated - {file}:{line}: {message} (at {location} {instruction})")]
    InvariantViolation {
        /// Description of the violated invariant
        message: String,
        /// The rendered instruction, `#<index>: <text>`
        instruction: String,
        /// Source position of the instruction
        location: SourceLocation,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A construct that can only be lowered unsoundly, reported as an error in strict mode.
    #[error("Unsupported - {location} {instruction}: {message}")]
    Unsupported {
        /// What could not be modelled
        message: String,
        /// The rendered instruction, `#<index>: <text>`
        instruction: String,
        /// Source position of the instruction
        location: SourceLocation,
    },

    /// The resolved method already carries a translated body.
    #[error("Method {0} already has a translated body")]
    BodyAlreadyTranslated(String),

    /// A jump refers to a label that was never defined.
    #[error("Undefined label - {0}")]
    UndefinedLabel(String),

    /// A label was defined twice.
    #[error("Duplicate label - {0}")]
    DuplicateLabel(String),

    /// Graph arena operation on nodes that do not exist.
    #[error("{0}")]
    GraphError(String),
}
