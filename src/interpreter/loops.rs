//! Loop statement execution (`while`, `do-while`, `for`, `for`-each).
//!
//! Every loop runs its body through [`Interpreter::run_section`] with
//! jump-consumption on: `break` and `continue` end at the loop and the loop
//! itself completes with `Through`. `return` stops the loop and propagates.
//!
//! `for` and `for`-each bracket the whole statement in a scope of their own,
//! so the loop variable is gone once the loop finishes.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::exit::Outcome;
use crate::interpreter::indexable::Indexable;
use crate::interpreter::options::StatementOption;
use crate::interpreter::type_system::Type;
use crate::syntax::ast::{Expr, ForInit, Section, SourceLocation, TypeName};
use tracing::{debug, trace};

impl Interpreter {
    /// Run one iteration's body; returns true if the loop must stop
    fn run_loop_body(
        &mut self,
        body: &Section,
        option: &StatementOption,
        outcome: &mut Outcome,
    ) -> Result<bool, RuntimeError> {
        let run = self.run_section(body, option, true)?;
        let stop = run.should_exit;
        run.apply_to(outcome);
        Ok(stop)
    }

    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &Section,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let body_option = option.loop_body();
        let mut outcome = Outcome::through();
        while self.evaluate_condition(condition)? {
            if self.run_loop_body(body, &body_option, &mut outcome)? {
                break;
            }
        }
        Ok(outcome)
    }

    pub(crate) fn execute_do_while(
        &mut self,
        body: &Section,
        condition: &Expr,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let body_option = option.loop_body();
        let mut outcome = Outcome::through();
        loop {
            if self.run_loop_body(body, &body_option, &mut outcome)? {
                break;
            }
            if !self.evaluate_condition(condition)? {
                break;
            }
        }
        Ok(outcome)
    }

    pub(crate) fn execute_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Expr>,
        post: &[Expr],
        body: &Section,
        option: &StatementOption,
        location: SourceLocation,
    ) -> Result<Outcome, RuntimeError> {
        let body_option = option.loop_body();
        self.with_scope(|this| {
            match init {
                Some(ForInit::Declaration {
                    var_type,
                    declarators,
                }) => this.execute_var_decl(var_type, declarators, location)?,
                Some(ForInit::Expressions(exprs)) => {
                    for expr in exprs {
                        this.evaluate_statement_expr(expr)?;
                    }
                }
                None => {}
            }

            let mut outcome = Outcome::through();
            loop {
                if let Some(condition) = condition {
                    if !this.evaluate_condition(condition)? {
                        break;
                    }
                }
                if this.run_loop_body(body, &body_option, &mut outcome)? {
                    break;
                }
                for expr in post {
                    this.evaluate_statement_expr(expr)?;
                }
            }
            Ok(outcome)
        })
    }

    pub(crate) fn execute_for_each(
        &mut self,
        var_type: &TypeName,
        var_name: &str,
        iterable: &Expr,
        body: &Section,
        option: &StatementOption,
        location: SourceLocation,
    ) -> Result<Outcome, RuntimeError> {
        self.with_scope(|this| {
            let source = this.evaluate_statement_expr(iterable)?;
            let mut view = this.acquire_indexable(source)?;
            debug!(variable = var_name, "for-each view acquired");
            let result =
                this.iterate_view(view.as_mut(), var_type, var_name, body, option, location);
            view.dispose(&mut this.heap);
            debug!(variable = var_name, "for-each view disposed");
            result
        })
    }

    fn iterate_view(
        &mut self,
        view: &mut dyn Indexable,
        var_type: &TypeName,
        var_name: &str,
        body: &Section,
        option: &StatementOption,
        location: SourceLocation,
    ) -> Result<Outcome, RuntimeError> {
        let ty = self.resolve_type(var_type)?;
        if ty == Type::Void {
            return Err(RuntimeError::VoidVariable {
                name: var_name.to_string(),
                location,
            });
        }
        self.check_visibility(&ty)?;
        self.check_name_clash(var_name)?;
        self.declare_variable(var_name, ty)?;

        let body_option = option.loop_body();
        let mut outcome = Outcome::through();
        while view.has_next(&self.heap) {
            let Some(element) = view.current(&self.heap) else {
                break;
            };
            view.advance();
            trace!(index = view.position() - 1, "for-each element");
            self.assign_variable(var_name, element)?;
            if self.run_loop_body(body, &body_option, &mut outcome)? {
                break;
            }
        }
        Ok(outcome)
    }
}
