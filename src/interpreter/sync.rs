//! `sync (lock) { ... }`
//!
//! The lock expression must evaluate to an instance of exactly
//! `System.Concurrency.Lock`. Its `lock()` and `unlock()` methods are invoked
//! through the ordinary method-call path around the body, and `unlock()`
//! runs however the body ends, aborts and structural errors included.

use crate::interpreter::builtins::{KnownException, LOCK_CLASS};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::exit::Outcome;
use crate::interpreter::options::StatementOption;
use crate::interpreter::type_system::Type;
use crate::syntax::ast::{Expr, Stmt};
use tracing::debug;

impl Interpreter {
    pub(crate) fn execute_sync(
        &mut self,
        lock: &Expr,
        body: &[Stmt],
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let value = self.evaluate_statement_expr(lock)?;
        if value.is_null() {
            return Err(self.raise_known(
                KnownException::NullReference,
                "The lock of a sync statement is null.",
            ));
        }
        let found = self.runtime_type(&value);
        if found != Type::Class(self.builtins.lock) {
            let type_name = self.types.type_name(&found);
            return Err(self.raise_known(
                KnownException::RuntimeCheck,
                format!(
                    "A sync statement must start with an expression that evaluates to an object of type '{}'. But saw a '{}'.",
                    LOCK_CLASS, type_name
                ),
            ));
        }

        self.invoke_method(value.clone(), "lock", Vec::new())?;
        debug!("sync lock acquired");
        let body_run = self.run_block(body, option, true);
        let released = self.invoke_method(value, "unlock", Vec::new());
        debug!("sync lock released");

        // A failing unlock takes precedence over the body's own completion
        released?;
        Ok(body_run?.into_outcome())
    }
}
