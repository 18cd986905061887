//! Runtime error taxonomy
//!
//! Every fault in this runtime is a programming error: either the code
//! generator emitted something malformed, or a program broke a builtin's
//! precondition. Nothing here is caught and recovered from internally. Errors
//! propagate with `?` up to the process entry point, which prints the
//! diagnostic and exits with status 1.

/// Fatal runtime error.
#[derive(Debug)]
pub enum RuntimeError {
    /// Caller supplied a different number of arguments than the skeleton declares
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// More arguments than the specialized entry points support
    UnsupportedArity { name: String, arity: usize },
    /// Capture recipe entry points outside the parent captures or fresh cells
    CaptureOutOfRange {
        skeleton: String,
        entry: usize,
        source: CaptureSource,
        index: usize,
        available: usize,
    },
    /// Constant pool index out of range
    ConstantOutOfRange {
        skeleton: String,
        index: usize,
        len: usize,
    },
    /// Instance capture array index out of range
    CellOutOfRange {
        closure: String,
        index: usize,
        len: usize,
    },
    /// Nested skeleton table index out of range
    NestedOutOfRange {
        skeleton: String,
        index: usize,
        len: usize,
    },
    /// Frame slot index out of range
    SlotOutOfRange { index: usize, len: usize },
    /// Global table index out of range
    GlobalOutOfRange { index: usize, len: usize },
    /// Attempted to call something that is not a closure
    NotCallable { value: String },
    /// A builtin received a value of the wrong kind
    TypeMismatch {
        builtin: &'static str,
        expected: &'static str,
        got: String,
    },
    /// A stack-resident cell was accessed after its frame was torn down
    DanglingCell { index: usize },
    /// A tail call was scheduled while another one was still pending
    TrampolineBusy { name: String },
    /// Writing to the output sink failed
    Io(std::io::Error),
}

/// Where a capture recipe entry takes its cell from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// The cells freshly created by the current call
    Fresh,
    /// The enclosing instance's own capture array
    Shared,
}

impl std::fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureSource::Fresh => write!(f, "fresh"),
            CaptureSource::Shared => write!(f, "shared"),
        }
    }
}

impl RuntimeError {
    /// Process exit status for this error.
    ///
    /// All runtime errors are fatal and map to the same status.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::ArityMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "closure `{}` called with wrong number of arguments: requires {}, got {}",
                name, expected, actual
            ),
            RuntimeError::UnsupportedArity { name, arity } => write!(
                f,
                "call with {} arguments is not supported (faulting closure: `{}`)",
                arity, name
            ),
            RuntimeError::CaptureOutOfRange {
                skeleton,
                entry,
                source,
                index,
                available,
            } => write!(
                f,
                "malformed skeleton `{}`: capture entry {} wants {} cell {}, only {} available",
                skeleton, entry, source, index, available
            ),
            RuntimeError::ConstantOutOfRange {
                skeleton,
                index,
                len,
            } => write!(
                f,
                "malformed skeleton `{}`: constant {} out of range (pool size {})",
                skeleton, index, len
            ),
            RuntimeError::CellOutOfRange {
                closure,
                index,
                len,
            } => write!(
                f,
                "closure `{}` has no captured cell {} ({} captured)",
                closure, index, len
            ),
            RuntimeError::NestedOutOfRange {
                skeleton,
                index,
                len,
            } => write!(
                f,
                "malformed skeleton `{}`: nested skeleton {} out of range (table size {})",
                skeleton, index, len
            ),
            RuntimeError::SlotOutOfRange { index, len } => {
                write!(f, "frame slot {} out of range (frame size {})", index, len)
            }
            RuntimeError::GlobalOutOfRange { index, len } => {
                write!(f, "global {} out of range ({} defined)", index, len)
            }
            RuntimeError::NotCallable { value } => {
                write!(f, "attempt to call a non-procedure: {}", value)
            }
            RuntimeError::TypeMismatch {
                builtin,
                expected,
                got,
            } => write!(f, "{}: expected {}, got {}", builtin, expected, got),
            RuntimeError::DanglingCell { index } => write!(
                f,
                "cell bound to frame slot {} was read after its frame returned",
                index
            ),
            RuntimeError::TrampolineBusy { name } => write!(
                f,
                "tail call to `{}` scheduled while another tail call is pending",
                name
            ),
            RuntimeError::Io(e) => write!(f, "output error: {}", e),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

/// Result alias used throughout the runtime
pub type Result<T> = std::result::Result<T, RuntimeError>;
