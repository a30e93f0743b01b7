//! `try` / `catch` / `finally` and `throw`
//!
//! Exceptions travel as [`RuntimeError::Exception`]. A `try` statement:
//!
//! 1. runs its body as a block;
//! 2. if the body threw a non-fatal exception, tries each catch clause in
//!    order and runs the first whose class the exception derives from, with
//!    the exception bound to the clause's variable in a scope of its own;
//! 3. runs `finally`, on every path, once;
//! 4. re-throws whatever is still pending: the original exception when no
//!    clause caught it, or the exception a catch clause threw.
//!
//! An exception thrown by `finally` replaces anything pending. A `break`,
//! `continue` or `return` inside `finally` replaces the body's own jump, but
//! not a pending exception.
//!
//! Structural errors and aborts are not exceptions: they skip both catch
//! clauses and `finally`.

use crate::interpreter::builtins::KnownException;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, ScriptException};
use crate::interpreter::exit::{ExitCause, Outcome};
use crate::interpreter::options::StatementOption;
use crate::interpreter::type_system::Type;
use crate::memory::scope::Variable;
use crate::memory::value::Value;
use crate::syntax::ast::{CatchClause, Expr, Stmt};
use tracing::debug;

impl Interpreter {
    pub(crate) fn execute_try(
        &mut self,
        body: &[Stmt],
        catches: &[CatchClause],
        finally: Option<&[Stmt]>,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let exception = match self.run_block(body, option, true) {
            Ok(run) => {
                let mut outcome = run.into_outcome();
                self.run_finally(finally, option, &mut outcome)?;
                return Ok(outcome);
            }
            Err(RuntimeError::Exception(exception)) => exception,
            Err(other) => return Err(other),
        };

        debug!(
            class = %exception.class_name,
            fatal = exception.fatal,
            "try body threw"
        );
        let handled = if exception.fatal {
            Ok(None)
        } else {
            self.run_catches(&exception, catches, option)
        };

        match handled {
            Ok(Some(mut outcome)) => {
                self.run_finally(finally, option, &mut outcome)?;
                Ok(outcome)
            }
            Ok(None) => {
                let mut outcome = Outcome::through();
                self.run_finally(finally, option, &mut outcome)?;
                Err(RuntimeError::Exception(exception))
            }
            Err(RuntimeError::Exception(rethrown)) => {
                let mut outcome = Outcome::through();
                self.run_finally(finally, option, &mut outcome)?;
                Err(RuntimeError::Exception(rethrown))
            }
            Err(other) => Err(other),
        }
    }

    /// Run the first matching catch clause. `Ok(None)` if none matched.
    fn run_catches(
        &mut self,
        exception: &ScriptException,
        catches: &[CatchClause],
        option: &StatementOption,
    ) -> Result<Option<Outcome>, RuntimeError> {
        for clause in catches {
            let catch_type = self.resolve_type(&clause.exception_type)?;
            let catch_class = match catch_type {
                Type::Class(id) if self.is_exception_class(id) => id,
                _ => {
                    return Err(RuntimeError::IllegalCatchType {
                        type_name: clause.exception_type.to_string(),
                        location: clause.location,
                    })
                }
            };
            if !self.types.is_derived_from(exception.class_id, catch_class) {
                continue;
            }

            debug!(class = %exception.class_name, variable = %clause.name, "exception caught");
            let bound = Variable::new(catch_type, Value::Object(exception.object));
            let run = self.with_scope(|this| {
                this.declare_caught(&clause.name, bound)?;
                this.run_block(&clause.body, option, true)
            })?;
            return Ok(Some(run.into_outcome()));
        }
        Ok(None)
    }

    fn declare_caught(&mut self, name: &str, bound: Variable) -> Result<(), RuntimeError> {
        self.check_name_clash(name)?;
        if let Err(e) = self.scopes.add_variable(name, bound) {
            return Err(self.raise_known(KnownException::NamespaceConflict, e.to_string()));
        }
        Ok(())
    }

    /// Run a finally block, if any, against the pending outcome
    fn run_finally(
        &mut self,
        finally: Option<&[Stmt]>,
        option: &StatementOption,
        pending: &mut Outcome,
    ) -> Result<(), RuntimeError> {
        let Some(statements) = finally else {
            return Ok(());
        };
        if pending.cause == ExitCause::Returned {
            pending.result = pending.result.replicate_value();
        }
        let run = self.run_block(statements, option, false)?;
        if run.cause.is_aborted() {
            run.apply_to(pending);
        }
        Ok(())
    }

    /// Evaluate a thrown expression and turn it into the error to propagate
    pub(crate) fn execute_throw(&mut self, expr: &Expr) -> RuntimeError {
        let value = match self.evaluate_statement_expr(expr) {
            Ok(value) => value,
            Err(e) => return e,
        };
        match self.exception_from_value(value) {
            Ok(exception) => {
                debug!(class = %exception.class_name, message = %exception.message, "throw");
                RuntimeError::Exception(Box::new(exception))
            }
            Err(e) => e,
        }
    }
}
