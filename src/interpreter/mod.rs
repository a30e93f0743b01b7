//! Statement execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`Interpreter`] and its host-facing API
//! - [`section`]: Statement-list runner and per-statement dispatch
//! - [`exit`]: How a statement ended ([`ExitCause`]) and what it produced ([`ExecResult`])
//! - [`options`]: Which constructs a statement context permits ([`StatementOption`])
//! - [`errors`]: Script exceptions and structural runtime errors
//!
//! # Execution Model
//!
//! The interpreter walks statement trees directly. Every statement completes
//! with an [`Outcome`], a cause plus a result, and the enclosing construct
//! decides whether that cause stops it, is consumed by it, or travels further
//! out. Exceptions travel separately as [`RuntimeError::Exception`].
//!
//! Long-running scripts can be stopped from another thread through a
//! [`CancellationHandle`]; the interpreter polls it at expression and empty
//! statement boundaries.

pub mod builtins;
pub mod cancellation;
pub mod engine;
pub mod errors;
mod exceptions;
pub mod exit;
mod expressions;
pub mod indexable;
mod loops;
pub mod options;
mod section;
mod statements;
mod switch;
mod sync;
pub mod type_system;

pub use cancellation::CancellationHandle;
pub use engine::Interpreter;
pub use errors::{RuntimeError, ScriptException, SourceInfo};
pub use exit::{ExecResult, ExitCause, Outcome};
pub use options::StatementOption;
