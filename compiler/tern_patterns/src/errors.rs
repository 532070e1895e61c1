//! Error types for evaluation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries the typed category of a failure. Factory functions
//! (e.g., `arg_type_error()`) are the public API; they populate both `kind`
//! and `message`. Built-ins validate their operands before use and raise on
//! the first violation, naming the operand index.

use std::fmt;

use tern_ir::Expr;

/// Result of evaluation.
pub type EvalResult = Result<Expr, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Operands
    /// Operand has the wrong shape (e.g. a form where an atom is required).
    ArgTypeError {
        builtin: String,
        index: usize,
        expected: String,
    },
    /// Operand index or count outside the permitted range.
    ArgRangeError {
        builtin: String,
        index: usize,
        detail: String,
    },
    /// Wrong operand count.
    ArityError {
        name: String,
        expected: String,
        got: usize,
    },

    // Rule database
    EntryFenced {
        symbol: String,
        arity: usize,
    },
    UnknownEntry {
        symbol: String,
        arity: usize,
    },

    // Operators
    NotAnOperator {
        symbol: String,
    },

    // Sandbox and host
    SecurityBreach {
        operation: String,
    },
    FileNotFound {
        path: String,
    },

    // Evaluation control
    EvalDepthExceeded {
        limit: usize,
    },
    Interrupted,
    NotInDebugSession,
    /// A debugger session was asked to stop; unwinds to `CustomEval`.
    DebugStopped,

    /// Raised explicitly by user code (`Check`).
    UserRaised {
        message: String,
    },

    /// Catch-all for errors without a structured kind.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgTypeError {
                builtin,
                index,
                expected,
            } => write!(f, "{builtin}: argument {index} must be {expected}"),
            Self::ArgRangeError {
                builtin,
                index,
                detail,
            } => write!(f, "{builtin}: argument {index} out of range: {detail}"),
            Self::ArityError {
                name,
                expected,
                got,
            } => write!(f, "{name} expects {expected} arguments, got {got}"),

            Self::EntryFenced { symbol, arity } => {
                write!(f, "rule base {symbol}/{arity} is fenced")
            }
            Self::UnknownEntry { symbol, arity } => {
                write!(f, "no rule base declared for {symbol}/{arity}")
            }

            Self::NotAnOperator { symbol } => write!(f, "{symbol} is not an operator"),

            Self::SecurityBreach { operation } => {
                write!(f, "security breach: {operation} is not allowed in secure mode")
            }
            Self::FileNotFound { path } => write!(f, "file not found: {path}"),

            Self::EvalDepthExceeded { limit } => {
                write!(f, "maximum evaluation depth exceeded (limit: {limit})")
            }
            Self::Interrupted => write!(f, "evaluation interrupted by user"),
            Self::NotInDebugSession => write!(f, "not in a debug session"),
            Self::DebugStopped => write!(f, "debug session stopped"),

            Self::UserRaised { message } | Self::Custom { message } => f.write_str(message),
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Head symbol of the call, or the printed form for headless calls.
    pub name: String,
    /// Number of operands at the call.
    pub arity: usize,
}

/// Snapshot of the evaluation stack at an error site, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {}/{}", frame.name, frame.arity)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory errors.
    pub message: String,
    /// Evaluation stack at the raise site, attached by the evaluator.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
            backtrace: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            backtrace: None,
        }
    }

    /// Attach a backtrace to this error.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    /// Whether `TrapError` may catch this error.
    ///
    /// Interrupts and debugger stops always reach their own handler.
    #[inline]
    pub fn is_trappable(&self) -> bool {
        !matches!(
            self.kind,
            EvalErrorKind::Interrupted | EvalErrorKind::DebugStopped
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Operand errors

/// Operand `index` of `builtin` has the wrong shape.
#[cold]
pub fn arg_type_error(builtin: &str, index: usize, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgTypeError {
        builtin: builtin.to_string(),
        index,
        expected: expected.to_string(),
    })
}

/// Operand `index` of `builtin` is out of range.
#[cold]
pub fn arg_range_error(builtin: &str, index: usize, detail: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgRangeError {
        builtin: builtin.to_string(),
        index,
        detail: detail.into(),
    })
}

/// `name` was applied to `got` operands.
#[cold]
pub fn arity_error(name: &str, expected: impl Into<String>, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityError {
        name: name.to_string(),
        expected: expected.into(),
        got,
    })
}

// Rule database errors

#[cold]
pub fn entry_fenced(symbol: &str, arity: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EntryFenced {
        symbol: symbol.to_string(),
        arity,
    })
}

#[cold]
pub fn unknown_entry(symbol: &str, arity: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownEntry {
        symbol: symbol.to_string(),
        arity,
    })
}

#[cold]
pub fn not_an_operator(symbol: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnOperator {
        symbol: symbol.to_string(),
    })
}

// Sandbox and host errors

#[cold]
pub fn security_breach(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SecurityBreach {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn file_not_found(path: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FileNotFound {
        path: path.to_string(),
    })
}

// Evaluation control

#[cold]
pub fn eval_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EvalDepthExceeded { limit })
}

#[cold]
pub fn interrupted() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Interrupted)
}

#[cold]
pub fn not_in_debug_session() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotInDebugSession)
}

#[cold]
pub fn debug_stopped() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DebugStopped)
}

/// Explicit failure raised by user code.
#[cold]
pub fn user_raised(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UserRaised {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factory_message_matches_kind_display() {
        let err = arg_type_error("Nth", 2, "an integer");
        assert_eq!(err.message, "Nth: argument 2 must be an integer");
        assert_eq!(err.message, err.kind.to_string());
    }

    #[test]
    fn user_raised_keeps_message_verbatim() {
        let err = user_raised("bad input");
        assert_eq!(err.to_string(), "bad input");
        assert!(err.is_trappable());
    }

    #[test]
    fn control_errors_are_not_trappable() {
        assert!(!interrupted().is_trappable());
        assert!(!debug_stopped().is_trappable());
        assert!(eval_depth_exceeded(10).is_trappable());
    }

    #[test]
    fn backtrace_display_lists_innermost_first() {
        let trace = EvalBacktrace::new(vec![
            BacktraceFrame {
                name: "g".into(),
                arity: 1,
            },
            BacktraceFrame {
                name: "f".into(),
                arity: 2,
            },
        ]);
        assert_eq!(trace.to_string(), "stack backtrace:\n  0: g/1\n  1: f/2\n");
        assert_eq!(trace.len(), 2);
    }
}
