//! Error taxonomy and control-flow codes.

use thiserror::Error;

/// The kinds of error an evaluation can latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Lexer or structure error in the script.
    #[error("syntax error")]
    Syntax,

    /// Read of an undefined variable, or `global` of an unknown
    /// top-level name.
    #[error("unknown variable")]
    VarUnknown,

    /// Malformed or overlong variable name, or a `global` collision
    /// with an existing local.
    #[error("bad variable name")]
    VarName,

    /// Command not registered, or arity mismatch.
    #[error("unknown command")]
    CmdUnknown,

    /// A built-in received the wrong number of arguments.
    #[error("wrong number of arguments")]
    Param,

    /// Any error from the expression sublanguage.
    #[error("expression error")]
    Expr,

    /// Allocation failure.
    #[error("out of memory")]
    Memory,
}

/// Control-flow code returned by command handlers and the evaluator.
///
/// `Error` is sticky across dispatch; `Return`, `Break`, and `Again`
/// pass through the evaluator and are consumed by the loop and proc
/// built-ins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Return,
    Break,
    /// `continue`.
    Again,
    Error(ErrorKind),
}

impl Flow {
    pub fn is_error(&self) -> bool {
        matches!(self, Flow::Error(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Flow::Error(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// The error surfaced to the host from a failed evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ScriptError {
    /// The first error latched during the evaluation.
    pub kind: ErrorKind,
    /// Byte offset of the top-level token being processed when the
    /// error latched. Translate with `Interp::error_position`.
    pub offset: usize,
}

/// Result alias for host-facing evaluation.
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;
