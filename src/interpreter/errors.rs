//! Runtime error types
//!
//! [`RuntimeError`] is the error half of every statement handler's result. It
//! has three families, and they propagate differently:
//!
//! - [`RuntimeError::Exception`]: a script-level exception object. It can be
//!   caught by `try`/`catch`, and `finally` blocks run while it unwinds.
//! - Structural errors (illegal lexical context, void declarations, invalid
//!   catch types): these reflect a malformed program. They bubble straight to
//!   the host and are never caught by script code.
//! - [`RuntimeError::Aborted`]: the owning thread was asked to stop. It
//!   unwinds every frame without running further script code.

use crate::interpreter::type_system::ClassId;
use crate::memory::value::ObjRef;
use crate::syntax::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Where an exception first crossed a statement boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub file: String,
    pub line: usize,
}

/// A thrown script exception
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptException {
    /// The exception object on the heap
    pub object: ObjRef,
    pub class_id: ClassId,
    pub class_name: String,
    pub message: String,
    /// Fatal exceptions skip every catch clause; finally blocks still run
    pub fatal: bool,
    pub source: Option<SourceInfo>,
}

impl fmt::Display for ScriptException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({}:{})", source.file, source.line)?;
        }
        Ok(())
    }
}

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Exception(Box<ScriptException>),

    /// A construct used where the enclosing context forbids it
    /// (`break` outside a loop, function definition inside a block, ...)
    #[error("Illegal place to use {construct} (line {})", .location.line)]
    IllegalContext {
        construct: String,
        location: SourceLocation,
    },

    #[error("Cannot define a void variable '{name}' (line {})", .location.line)]
    VoidVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("Parameter '{name}' of function '{function}' cannot be void (line {})", .location.line)]
    VoidParameter {
        function: String,
        name: String,
        location: SourceLocation,
    },

    #[error("Catch type '{type_name}' is not an exception class (line {})", .location.line)]
    IllegalCatchType {
        type_name: String,
        location: SourceLocation,
    },

    #[error("Thread '{thread}' was aborted")]
    Aborted { thread: String },
}

impl RuntimeError {
    /// Source location of a structural error, or of an exception's origin
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            RuntimeError::IllegalContext { location, .. }
            | RuntimeError::VoidVariable { location, .. }
            | RuntimeError::VoidParameter { location, .. }
            | RuntimeError::IllegalCatchType { location, .. } => Some(*location),
            RuntimeError::Exception(e) => e
                .source
                .as_ref()
                .map(|source| SourceLocation::new(source.line, 0)),
            RuntimeError::Aborted { .. } => None,
        }
    }

    pub fn as_exception(&self) -> Option<&ScriptException> {
        match self {
            RuntimeError::Exception(e) => Some(e),
            _ => None,
        }
    }

    /// True for errors caused by a malformed program
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RuntimeError::IllegalContext { .. }
                | RuntimeError::VoidVariable { .. }
                | RuntimeError::VoidParameter { .. }
                | RuntimeError::IllegalCatchType { .. }
        )
    }
}
