//! Lexical permissions for statement execution
//!
//! A [`StatementOption`] travels down the statement tree and says which
//! constructs are legal at the current position. Options are immutable; each
//! compound statement derives the option for its children.
//!
//! Only the jump permissions (`break`, `continue`, `return`) are inherited by
//! nested statements. Definition permissions and evaluation modes apply to
//! the statement list they were given to and nothing below it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementOption {
    pub allow_break: bool,
    pub allow_continue: bool,
    pub allow_return: bool,
    pub allow_function_def: bool,
    pub allow_class_def: bool,
    /// Stop after the first statement of a list
    pub no_sequential: bool,
    /// Keep the value of every statement, not only returned ones
    pub preserve_stmt_result: bool,
    pub ignore_case: bool,
    pub ignore_default: bool,
    /// Lets the source reader end an expression at end of input
    pub allow_end_expr_by_eof: bool,
}

impl StatementOption {
    /// Option for a program's top level
    pub fn global() -> Self {
        StatementOption {
            allow_return: true,
            allow_function_def: true,
            allow_class_def: true,
            ..Default::default()
        }
    }

    /// Option for a function body
    pub fn function_body() -> Self {
        StatementOption {
            allow_return: true,
            ..Default::default()
        }
    }

    /// Option for evaluating a snippet and keeping every statement's value
    pub fn evaluation() -> Self {
        StatementOption {
            preserve_stmt_result: true,
            ..Self::global()
        }
    }

    /// Copy of the jump permissions; everything else reset
    pub fn inherited(&self) -> Self {
        StatementOption {
            allow_break: self.allow_break,
            allow_continue: self.allow_continue,
            allow_return: self.allow_return,
            ..Default::default()
        }
    }

    /// Option for a loop body: inherited, with `break` and `continue` allowed
    pub fn loop_body(&self) -> Self {
        StatementOption {
            allow_break: true,
            allow_continue: true,
            ..self.inherited()
        }
    }

    /// Option for the statements of a matched switch case
    pub fn switch_clause(&self) -> Self {
        StatementOption {
            allow_break: true,
            ignore_case: true,
            ignore_default: true,
            ..self.inherited()
        }
    }
}
