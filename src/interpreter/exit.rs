//! Statement completion records
//!
//! Every statement handler completes with an [`Outcome`]: an [`ExitCause`]
//! saying how control left the statement, and an [`ExecResult`] carrying the
//! value it produced. Outcomes are plain values built fresh for each call, so
//! the same statement tree can run on several threads or re-entrantly.

use crate::interpreter::errors::ScriptException;
use crate::memory::value::Value;

/// How control left a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitCause {
    /// No statement has completed yet
    #[default]
    Undefined,
    /// Normal completion
    Through,
    Broken,
    Continued,
    Returned,
    /// An uncaught exception ended the program
    Faulted,
}

impl ExitCause {
    /// True if the remaining statements of the enclosing list must be skipped
    pub fn is_aborted(self) -> bool {
        matches!(
            self,
            ExitCause::Broken | ExitCause::Continued | ExitCause::Returned
        )
    }
}

/// Value produced by a statement
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExecResult {
    #[default]
    Void,
    Value(Value),
    Exception(Box<ScriptException>),
}

impl ExecResult {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Void => ExecResult::Void,
            other => ExecResult::Value(other),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ExecResult::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Detached copy of the result. Primitives and strings are copied;
    /// object references still share the heap object.
    pub fn replicate_value(&self) -> Self {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub cause: ExitCause,
    pub result: ExecResult,
}

impl Outcome {
    pub fn new(cause: ExitCause, result: ExecResult) -> Self {
        Outcome { cause, result }
    }

    pub fn through() -> Self {
        Self::new(ExitCause::Through, ExecResult::Void)
    }

    pub fn through_with(result: ExecResult) -> Self {
        Self::new(ExitCause::Through, result)
    }

    pub fn returned(result: ExecResult) -> Self {
        Self::new(ExitCause::Returned, result)
    }

    pub fn broken() -> Self {
        Self::new(ExitCause::Broken, ExecResult::Void)
    }

    pub fn continued() -> Self {
        Self::new(ExitCause::Continued, ExecResult::Void)
    }

    /// Returned value, if the outcome carries one
    pub fn value(&self) -> Option<&Value> {
        self.result.value()
    }
}
