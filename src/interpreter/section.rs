//! Statement lists and sections
//!
//! Two layers sit between a compound statement and its children:
//!
//! - The **dispatcher** ([`Interpreter::execute_statements`]) runs a flat
//!   list of statements in order. It enforces the lexical permissions of the
//!   [`StatementOption`], folds each child's [`Outcome`] into the list's own,
//!   and stops at the first `break`, `continue` or `return`.
//! - The **section runner** ([`Interpreter::run_section`] and
//!   [`Interpreter::run_block`]) wraps a list in a scope when it is a braced
//!   block, then translates the list's exit cause for the compound statement
//!   that owns it: loops consume `break` and `continue`, everything else
//!   passes them outward.
//!
//! # Folding Rules
//!
//! | child cause | enclosing cause (consuming) | enclosing cause (propagating) | owner stops? |
//! |-------------|-----------------------------|-------------------------------|--------------|
//! | `Broken`    | `Through`                   | `Broken`                      | yes          |
//! | `Continued` | `Through`                   | `Continued`                   | no           |
//! | `Returned`  | `Returned`                  | `Returned`                    | yes          |
//! | other       | `Through`                   | `Through`                     | no           |

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, SourceInfo};
use crate::interpreter::exit::{ExecResult, ExitCause, Outcome};
use crate::interpreter::options::StatementOption;
use crate::syntax::ast::{Section, SourceLocation, Stmt};
use tracing::trace;

/// Free native stack below which a fresh segment is allocated
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each segment allocated once the red zone is reached
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f` on a native stack with at least [`STACK_RED_ZONE`] bytes free.
///
/// Statements and calls recurse through several Rust frames each, so deep
/// script recursion would otherwise exhaust the host thread's stack before
/// the call-depth limit is reached.
pub(crate) fn ensure_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

/// Completion of a section, as seen by the statement that owns it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SectionRun {
    pub cause: ExitCause,
    /// `None` leaves the owner's current result untouched
    pub result: Option<ExecResult>,
    /// The owner must stop iterating
    pub should_exit: bool,
}

impl SectionRun {
    /// Fold this run into the owner's outcome
    pub(crate) fn apply_to(self, outcome: &mut Outcome) {
        outcome.cause = self.cause;
        if let Some(result) = self.result {
            outcome.result = result;
        }
    }

    pub(crate) fn into_outcome(self) -> Outcome {
        let mut outcome = Outcome::through();
        self.apply_to(&mut outcome);
        outcome
    }
}

impl Interpreter {
    /// Run `f` inside a fresh scope. The scope is exited on every path.
    pub(crate) fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.scopes.enter_scope();
        let result = f(self);
        self.scopes.exit_scope();
        result
    }

    /// Run a loop body or if-branch
    pub(crate) fn run_section(
        &mut self,
        section: &Section,
        option: &StatementOption,
        consume_jump_out: bool,
    ) -> Result<SectionRun, RuntimeError> {
        let outcome = match section {
            Section::Block(statements) => {
                self.with_scope(|this| this.execute_statements(statements, option))?
            }
            Section::Single(statement) => {
                self.execute_statements(std::slice::from_ref(statement.as_ref()), option)?
            }
        };
        Ok(fold_section(outcome, consume_jump_out, true))
    }

    /// Run a braced block that does not own loop jumps: try, catch, finally and sync bodies.
    /// With `overwrite_result` off, only a `return` replaces the owner's result.
    pub(crate) fn run_block(
        &mut self,
        statements: &[Stmt],
        option: &StatementOption,
        overwrite_result: bool,
    ) -> Result<SectionRun, RuntimeError> {
        let outcome = self.with_scope(|this| this.execute_statements(statements, option))?;
        Ok(fold_section(outcome, false, overwrite_result))
    }

    /// Run a statement list in the current scope
    pub(crate) fn execute_statements(
        &mut self,
        statements: &[Stmt],
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let mut outcome = Outcome::default();

        for statement in statements {
            let step = ensure_stack(|| self.execute_statement(statement, option))
                .map_err(|e| self.attach_source_info(e, statement.location()))?;

            if !statement.is_declaration() {
                outcome.cause = step.cause;
                match step.cause {
                    ExitCause::Returned => outcome.result = step.result,
                    ExitCause::Broken | ExitCause::Continued => outcome.result = ExecResult::Void,
                    _ if option.preserve_stmt_result && yields_result(statement) => {
                        outcome.result = step.result
                    }
                    _ => {}
                }
            }

            if outcome.cause.is_aborted() || option.no_sequential {
                break;
            }
        }

        if outcome.cause == ExitCause::Undefined {
            outcome.cause = ExitCause::Through;
        }
        Ok(outcome)
    }

    /// Dispatch one statement to its handler
    pub(crate) fn execute_statement(
        &mut self,
        statement: &Stmt,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        trace!(line = statement.location().line, "executing statement");
        match statement {
            Stmt::VarDecl {
                var_type,
                declarators,
                location,
            } => {
                self.execute_var_decl(var_type, declarators, *location)?;
                Ok(Outcome::through())
            }

            Stmt::FunctionDecl(decl) => {
                if !option.allow_function_def {
                    return Err(illegal("function definition", decl.location));
                }
                self.execute_function_decl(decl)?;
                Ok(Outcome::through())
            }

            Stmt::ClassDecl {
                name,
                parent,
                visibility,
                location,
            } => {
                if !option.allow_class_def {
                    return Err(illegal("class definition", *location));
                }
                self.execute_class_decl(name, parent.as_ref(), *visibility)?;
                Ok(Outcome::through())
            }

            Stmt::EnumDecl {
                name,
                literals,
                location,
            } => {
                if !option.allow_class_def {
                    return Err(illegal("enum definition", *location));
                }
                self.execute_enum_decl(name, literals)?;
                Ok(Outcome::through())
            }

            Stmt::Empty { .. } => {
                self.empty_statement_checkpoint()?;
                Ok(Outcome::through())
            }

            Stmt::Expression { expr, .. } => {
                let value = self.evaluate_statement_expr(expr)?;
                Ok(Outcome::through_with(ExecResult::from_value(value)))
            }

            // A nested block keeps the enclosing list's permissions
            Stmt::Block { body, .. } => {
                self.with_scope(|this| this.execute_statements(body, option))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(
                condition,
                then_branch,
                else_branch.as_ref(),
                &option.inherited(),
            ),

            Stmt::Switch {
                selector,
                cases,
                default,
                ..
            } => self.execute_switch(selector, cases, default.as_deref(), &option.inherited()),

            Stmt::While {
                condition, body, ..
            } => self.execute_while(condition, body, &option.inherited()),

            Stmt::DoWhile {
                body, condition, ..
            } => self.execute_do_while(body, condition, &option.inherited()),

            Stmt::For {
                init,
                condition,
                post,
                body,
                location,
            } => self.execute_for(
                init.as_ref(),
                condition.as_ref(),
                post,
                body,
                &option.inherited(),
                *location,
            ),

            Stmt::ForEach {
                var_type,
                var_name,
                iterable,
                body,
                location,
            } => self.execute_for_each(
                var_type,
                var_name,
                iterable,
                body,
                &option.inherited(),
                *location,
            ),

            Stmt::Try {
                body,
                catches,
                finally,
                ..
            } => self.execute_try(body, catches, finally.as_deref(), &option.inherited()),

            Stmt::Throw { expr, .. } => Err(self.execute_throw(expr)),

            Stmt::Break { location } => {
                if !option.allow_break {
                    return Err(illegal("break", *location));
                }
                Ok(Outcome::broken())
            }

            Stmt::Continue { location } => {
                if !option.allow_continue {
                    return Err(illegal("continue", *location));
                }
                Ok(Outcome::continued())
            }

            Stmt::Return { expr, location } => {
                if !option.allow_return {
                    return Err(illegal("return", *location));
                }
                self.execute_return(expr.as_ref())
            }

            Stmt::Sync { lock, body, .. } => self.execute_sync(lock, body, &option.inherited()),
        }
    }

    /// Record where an exception first crossed a statement boundary
    fn attach_source_info(&self, error: RuntimeError, location: SourceLocation) -> RuntimeError {
        match error {
            RuntimeError::Exception(mut exception) if exception.source.is_none() => {
                exception.source = Some(SourceInfo {
                    file: self.config.script_name.clone(),
                    line: location.line,
                });
                RuntimeError::Exception(exception)
            }
            other => other,
        }
    }
}

fn fold_section(outcome: Outcome, consume_jump_out: bool, overwrite_result: bool) -> SectionRun {
    let (cause, should_exit) = match outcome.cause {
        ExitCause::Broken if consume_jump_out => (ExitCause::Through, true),
        ExitCause::Broken => (ExitCause::Broken, true),
        ExitCause::Continued if consume_jump_out => (ExitCause::Through, false),
        ExitCause::Continued => (ExitCause::Continued, false),
        ExitCause::Returned => (ExitCause::Returned, true),
        _ => (ExitCause::Through, false),
    };
    let result = (overwrite_result || cause == ExitCause::Returned).then_some(outcome.result);
    SectionRun {
        cause,
        result,
        should_exit,
    }
}

/// Statements whose value an evaluation keeps
fn yields_result(statement: &Stmt) -> bool {
    !matches!(
        statement,
        Stmt::Empty { .. } | Stmt::Throw { .. } | Stmt::Break { .. } | Stmt::Continue { .. }
    )
}

fn illegal(construct: &str, location: SourceLocation) -> RuntimeError {
    RuntimeError::IllegalContext {
        construct: construct.to_string(),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Value;

    fn outcome(cause: ExitCause, value: i32) -> Outcome {
        Outcome::new(cause, ExecResult::Value(Value::Int(value)))
    }

    #[test]
    fn test_loop_consumes_break_and_stops() {
        let run = fold_section(outcome(ExitCause::Broken, 1), true, true);
        assert_eq!(run.cause, ExitCause::Through);
        assert!(run.should_exit);
    }

    #[test]
    fn test_loop_consumes_continue_and_keeps_going() {
        let run = fold_section(outcome(ExitCause::Continued, 1), true, true);
        assert_eq!(run.cause, ExitCause::Through);
        assert!(!run.should_exit);
    }

    #[test]
    fn test_branch_propagates_jumps() {
        let broken = fold_section(outcome(ExitCause::Broken, 1), false, true);
        assert_eq!(broken.cause, ExitCause::Broken);
        assert!(broken.should_exit);

        let continued = fold_section(outcome(ExitCause::Continued, 1), false, true);
        assert_eq!(continued.cause, ExitCause::Continued);
        assert!(!continued.should_exit);
    }

    #[test]
    fn test_return_always_carries_result() {
        let run = fold_section(outcome(ExitCause::Returned, 7), true, false);
        assert_eq!(run.cause, ExitCause::Returned);
        assert!(run.should_exit);
        assert_eq!(run.result, Some(ExecResult::Value(Value::Int(7))));
    }

    #[test]
    fn test_normal_completion_respects_overwrite_flag() {
        let kept = fold_section(outcome(ExitCause::Through, 3), false, false);
        assert_eq!(kept.result, None);
        assert!(!kept.should_exit);

        let mut owner = Outcome::through_with(ExecResult::Value(Value::Int(9)));
        kept.apply_to(&mut owner);
        assert_eq!(owner.value(), Some(&Value::Int(9)));
    }
}
