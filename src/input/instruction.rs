//! Instructions of the normalized stream.

use std::fmt;

use crate::{
    cfg::SourceLocation,
    input::{InvokeExpr, LocalId, Value},
};

/// Position of an instruction in its [`Body`](crate::input::Body); also its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub(crate) usize);

impl InstrId {
    /// Creates an `InstrId` from a raw position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        InstrId(index)
    }

    /// Returns the raw position.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// The following position.
    #[must_use]
    pub const fn next(self) -> Self {
        InstrId(self.0 + 1)
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an instruction does.
///
/// Switches, subroutine returns and throws are part of the stream format but must have been
/// removed by normalization before translation.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// `lhs = rhs`; at most one side is a field or array reference
    Assign {
        /// Assigned location: local, field or array element
        lhs: Value,
        /// Assigned value
        rhs: Value,
    },
    /// `local := @parameter / @this / @caughtexception`
    Identity {
        /// Bound local
        local: LocalId,
        /// Parameter, receiver or exception reference
        rhs: Value,
    },
    /// Unconditional jump
    Goto(InstrId),
    /// Jump to `target` if `condition` holds, fall through otherwise
    If {
        /// Branch condition
        condition: Value,
        /// Jump target
        target: InstrId,
    },
    /// A call whose result is discarded
    Invoke(InvokeExpr),
    /// Return with a value
    Return(Value),
    /// Return from a void method
    ReturnVoid,
    /// Acquire the monitor of an object
    EnterMonitor(Value),
    /// Release the monitor of an object
    ExitMonitor(Value),
    /// No operation
    Nop,
    /// Debugger breakpoint, a no-op here
    Breakpoint,
    /// Dense multi-way branch
    TableSwitch {
        /// Switch key
        key: Value,
        /// Key of the first target
        low: i32,
        /// One target per key starting at `low`
        targets: Vec<InstrId>,
        /// Target for keys out of range
        default: InstrId,
    },
    /// Sparse multi-way branch
    LookupSwitch {
        /// Switch key
        key: Value,
        /// `(key, target)` pairs
        cases: Vec<(i32, InstrId)>,
        /// Target for unmatched keys
        default: InstrId,
    },
    /// Return from a subroutine through a return-address local
    Ret(LocalId),
    /// Throw an exception
    Throw(Value),
}

impl InstructionKind {
    /// Returns true if control can continue with the next instruction.
    #[must_use]
    pub fn falls_through(&self) -> bool {
        !matches!(
            self,
            InstructionKind::Goto(_)
                | InstructionKind::Return(_)
                | InstructionKind::ReturnVoid
                | InstructionKind::TableSwitch { .. }
                | InstructionKind::LookupSwitch { .. }
                | InstructionKind::Ret(_)
                | InstructionKind::Throw(_)
        )
    }

    /// Explicit jump targets, in operand order.
    #[must_use]
    pub fn jump_targets(&self) -> Vec<InstrId> {
        match self {
            InstructionKind::Goto(target) | InstructionKind::If { target, .. } => vec![*target],
            InstructionKind::TableSwitch {
                targets, default, ..
            } => targets.iter().copied().chain([*default]).collect(),
            InstructionKind::LookupSwitch { cases, default, .. } => cases
                .iter()
                .map(|(_, target)| *target)
                .chain([*default])
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionKind::Assign { lhs, rhs } => write!(f, "{lhs} = {rhs}"),
            InstructionKind::Identity { local, rhs } => write!(f, "{local} := {rhs}"),
            InstructionKind::Goto(target) => write!(f, "goto {target}"),
            InstructionKind::If { condition, target } => {
                write!(f, "if {condition} goto {target}")
            }
            InstructionKind::Invoke(expr) => write!(f, "{expr}"),
            InstructionKind::Return(value) => write!(f, "return {value}"),
            InstructionKind::ReturnVoid => write!(f, "return"),
            InstructionKind::EnterMonitor(value) => write!(f, "entermonitor {value}"),
            InstructionKind::ExitMonitor(value) => write!(f, "exitmonitor {value}"),
            InstructionKind::Nop => write!(f, "nop"),
            InstructionKind::Breakpoint => write!(f, "breakpoint"),
            InstructionKind::TableSwitch {
                key,
                low,
                targets,
                default,
            } => {
                write!(f, "tableswitch({key}) {{")?;
                for (offset, target) in targets.iter().enumerate() {
                    write!(f, " case {}: goto {target};", i64::from(*low) + offset as i64)?;
                }
                write!(f, " default: goto {default}; }}")
            }
            InstructionKind::LookupSwitch {
                key,
                cases,
                default,
            } => {
                write!(f, "lookupswitch({key}) {{")?;
                for (value, target) in cases {
                    write!(f, " case {value}: goto {target};")?;
                }
                write!(f, " default: goto {default}; }}")
            }
            InstructionKind::Ret(local) => write!(f, "ret {local}"),
            InstructionKind::Throw(value) => write!(f, "throw {value}"),
        }
    }
}

/// One instruction with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The operation
    pub kind: InstructionKind,
    /// Where it came from
    pub location: SourceLocation,
}

impl Instruction {
    /// Creates an instruction.
    #[must_use]
    pub fn new(kind: InstructionKind, location: SourceLocation) -> Self {
        Instruction { kind, location }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
