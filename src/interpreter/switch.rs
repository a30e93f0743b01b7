//! `switch` statement execution
//!
//! The selector is evaluated once. Case labels are then tried in source
//! order:
//!
//! - For an enum selector, labels are compared by the literal's name. Both a
//!   bare identifier and a string label name a literal.
//! - Otherwise a label matches when its value has exactly the selector's
//!   runtime type and compares equal. A bare identifier label is read as a
//!   variable, and a `typeof(T)` label resolves `T`. Labels that do not
//!   resolve are skipped rather than reported.
//!
//! On a match, the statements of that case and every following case run as
//! one list (fallthrough). `default` runs when nothing matched, or when the
//! matched statements fell off the end without jumping. `break` ends the
//! switch; `continue` and `return` travel outward.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::exit::{ExitCause, Outcome};
use crate::interpreter::options::StatementOption;
use crate::memory::value::Value;
use crate::syntax::ast::{CaseClause, CaseLabel, Expr, Stmt};
use tracing::trace;

impl Interpreter {
    pub(crate) fn execute_switch(
        &mut self,
        selector: &Expr,
        cases: &[CaseClause],
        default: Option<&[Stmt]>,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let selector_value = self.evaluate_statement_expr(selector)?;
        let matched = self.find_case(&selector_value, cases);
        trace!(?matched, "switch case selected");

        self.with_scope(|this| {
            let mut outcome = Outcome::through();
            let run_default = match matched {
                Some(start) => {
                    let clause_option = option.switch_clause();
                    let mut fallthrough = Outcome::default();
                    for clause in &cases[start..] {
                        fallthrough = this.execute_statements(&clause.body, &clause_option)?;
                        if fallthrough.cause.is_aborted() {
                            break;
                        }
                    }
                    let fell_off = !fallthrough.cause.is_aborted();
                    absorb(&mut outcome, fallthrough);
                    fell_off
                }
                None => true,
            };

            if run_default {
                if let Some(statements) = default {
                    let default_outcome =
                        this.execute_statements(statements, &option.switch_clause())?;
                    absorb(&mut outcome, default_outcome);
                }
            }
            Ok(outcome)
        })
    }

    /// Index of the first case whose label matches the selector
    fn find_case(&self, selector: &Value, cases: &[CaseClause]) -> Option<usize> {
        cases.iter().position(|clause| match selector {
            Value::Enum(e) => match &clause.label {
                CaseLabel::Ident(literal) | CaseLabel::Str(literal) => *literal == e.literal,
                _ => false,
            },
            _ => self
                .case_value(&clause.label)
                .is_some_and(|value| self.same_case_value(selector, &value)),
        })
    }

    /// Value of a case label, or `None` if the label does not resolve
    fn case_value(&self, label: &CaseLabel) -> Option<Value> {
        match label {
            CaseLabel::Int(n) => Some(Value::Int(*n)),
            CaseLabel::Char(c) => Some(Value::Char(*c)),
            CaseLabel::Str(s) => Some(Value::Str(s.clone())),
            CaseLabel::Bool(b) => Some(Value::Bool(*b)),
            CaseLabel::Ident(name) => self.scopes.lookup(name).map(|v| v.value.clone()),
            CaseLabel::TypeOf(type_name) => self.types.resolve(type_name).map(Value::Type),
        }
    }

    fn same_case_value(&self, selector: &Value, candidate: &Value) -> bool {
        self.runtime_type(selector) == self.runtime_type(candidate) && selector == candidate
    }
}

/// Fold a case run into the switch's outcome: `break` ends here, the other
/// jumps propagate.
fn absorb(outcome: &mut Outcome, run: Outcome) {
    if run.cause == ExitCause::Broken {
        outcome.cause = ExitCause::Through;
    } else {
        outcome.cause = run.cause;
        outcome.result = run.result;
    }
}
