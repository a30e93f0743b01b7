//! # Introduction
//!
//! scriptcore is the statement-execution core of a tree-walking interpreter
//! for a small, statically typed scripting language. It takes statement trees
//! built by a front end (or by [`syntax::build`]) and runs them against a
//! variable table, a type table and an object heap.
//!
//! ## Execution pipeline
//!
//! ```text
//! Statement tree → Interpreter (section runner → statement dispatch) → Outcome
//! ```
//!
//! 1. [`syntax`]: the statement and expression tree, plus builders.
//! 2. [`interpreter`]: runs statement lists, tracks how each statement ended
//!    and routes `break`, `continue`, `return` and exceptions.
//! 3. [`memory`]: values, scoped variables and the object heap.
//! 4. [`config`]: engine settings loaded from TOML.
//! 5. [`logging`]: `tracing` subscriber setup for hosts.
//!
//! ## Supported statements
//!
//! Declarations: variables, functions, classes, enums.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `for`-each,
//! `switch/case/default`, `break`, `continue`, `return`.
//! Exceptions: `try/catch/finally`, `throw`. Locking: `sync`.

pub mod config;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod syntax;

pub use config::EngineConfig;
pub use interpreter::{ExecResult, ExitCause, Interpreter, Outcome, RuntimeError, StatementOption};
