//! Cooperative cancellation
//!
//! Script threads are stopped by setting a flag from outside; executing code
//! polls it at checkpoints and unwinds with [`RuntimeError::Aborted`] once it
//! is set.
//!
//! Polling on every statement would be wasteful, so checkpoints are batched:
//!
//! - every expression statement bumps a counter; after a full batch the clock
//!   is read, and the flag is consulted once enough time has passed since the
//!   last check or the running total reaches a ceiling
//! - empty statements (`;`) use a separate, coarser counter and consult the
//!   flag directly whenever it fills up
//!
//! Counters live in the interpreter, one per script thread.

use crate::config::CancellationConfig;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Shared cancellation flag of one script thread
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the owning thread stop at its next checkpoint
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Checkpoint counters
#[derive(Debug, Clone)]
pub struct CancellationBudget {
    config: CancellationConfig,
    expressions: u32,
    empties: u32,
    total: u64,
    last_check: Instant,
}

impl CancellationBudget {
    pub fn new(config: CancellationConfig) -> Self {
        CancellationBudget {
            config,
            expressions: 0,
            empties: 0,
            total: 0,
            last_check: Instant::now(),
        }
    }

    /// Count one expression statement. Returns true if the flag should be
    /// consulted now.
    pub fn on_expression(&mut self) -> bool {
        self.expressions += 1;
        if self.expressions < self.config.expression_batch {
            return false;
        }
        self.total += u64::from(self.expressions);
        self.expressions = 0;

        let now = Instant::now();
        let interval = Duration::from_millis(self.config.check_interval_ms);
        if now.duration_since(self.last_check) >= interval || self.total >= self.config.expression_ceiling
        {
            self.last_check = now;
            self.total = 0;
            true
        } else {
            false
        }
    }

    /// Count one empty statement. Returns true if the flag should be consulted now.
    pub fn on_empty_statement(&mut self) -> bool {
        self.empties += 1;
        if self.empties < self.config.empty_statement_batch {
            return false;
        }
        self.empties = 0;
        true
    }
}

impl Interpreter {
    /// Checkpoint run before each expression statement is evaluated
    pub(crate) fn expression_checkpoint(&mut self) -> Result<(), RuntimeError> {
        if self.budget.on_expression() {
            self.check_cancelled()?;
        }
        Ok(())
    }

    /// Checkpoint run for each empty statement
    pub(crate) fn empty_statement_checkpoint(&mut self) -> Result<(), RuntimeError> {
        if self.budget.on_empty_statement() {
            self.check_cancelled()?;
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), RuntimeError> {
        if self.cancellation.is_cancelled() {
            warn!(thread = %self.thread_name, "cancellation requested, aborting");
            return Err(RuntimeError::Aborted {
                thread: self.thread_name.clone(),
            });
        }
        Ok(())
    }
}
