//! Simple statements and declarations
//!
//! This module handles:
//!
//! - Expression statements, including the guard expressions of compound
//!   statements, which all pass through the cancellation checkpoint
//! - `if` / `else`
//! - `return`
//! - Variable, function, class and enum declarations
//!
//! # Declarations
//!
//! A variable declaration resolves its type once, then handles each
//! declarator in order: name-clash checks, a binding holding the type's
//! default value, and finally the initializer's value assigned through the
//! ordinary assignment path. Function declarations register a function type
//! and bind the function value as a global.

use crate::interpreter::builtins::KnownException;
use crate::interpreter::engine::{FunctionDef, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::exit::{ExecResult, Outcome};
use crate::interpreter::options::StatementOption;
use crate::interpreter::type_system::Type;
use crate::memory::scope::{FrameKind, Variable};
use crate::memory::value::Value;
use crate::syntax::ast::*;
use std::rc::Rc;
use tracing::debug;

impl Interpreter {
    /// Evaluate an expression in statement position
    pub(crate) fn evaluate_statement_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.expression_checkpoint()?;
        self.evaluate_expr(expr)
    }

    /// Evaluate a guard expression; it must produce a boolean
    pub(crate) fn evaluate_condition(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        match self.evaluate_statement_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => {
                let type_name = self.types.type_name(&self.runtime_type(&other));
                Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!(
                        "The statement didn't produce a boolean value (found '{}').",
                        type_name
                    ),
                ))
            }
        }
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &Expr,
        then_branch: &Section,
        else_branch: Option<&Section>,
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        let branch = if self.evaluate_condition(condition)? {
            Some(then_branch)
        } else {
            else_branch
        };
        match branch {
            Some(section) => Ok(self.run_section(section, option, false)?.into_outcome()),
            None => Ok(Outcome::through()),
        }
    }

    pub(crate) fn execute_return(&mut self, expr: Option<&Expr>) -> Result<Outcome, RuntimeError> {
        let result = match expr {
            Some(expr) => ExecResult::from_value(self.evaluate_statement_expr(expr)?),
            None => ExecResult::Void,
        };
        Ok(Outcome::returned(result))
    }

    pub(crate) fn execute_var_decl(
        &mut self,
        var_type: &TypeName,
        declarators: &[Declarator],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let ty = self.resolve_type(var_type)?;
        self.check_visibility(&ty)?;
        if ty == Type::Void {
            return Err(RuntimeError::VoidVariable {
                name: declarators
                    .first()
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
                location,
            });
        }

        for declarator in declarators {
            self.check_name_clash(&declarator.name)?;
            self.declare_variable(&declarator.name, ty.clone())?;
            if let Some(init) = &declarator.init {
                let value = self.evaluate_statement_expr(init)?;
                if value.is_void() {
                    return Err(self.raise_known(
                        KnownException::RuntimeCheck,
                        format!(
                            "The initializer of '{}' does not produce a value.",
                            declarator.name
                        ),
                    ));
                }
                self.assign_variable(&declarator.name, value)?;
            }
        }
        Ok(())
    }

    /// Add a binding holding the type's default value to the current scope
    pub(crate) fn declare_variable(&mut self, name: &str, ty: Type) -> Result<(), RuntimeError> {
        let value = self.types.default_value(&ty);
        if let Err(e) = self.scopes.add_variable(name, Variable::new(ty, value)) {
            return Err(self.raise_known(KnownException::NamespaceConflict, e.to_string()));
        }
        Ok(())
    }

    /// Checks run before a new local or parameter name is bound
    pub(crate) fn check_name_clash(&mut self, name: &str) -> Result<(), RuntimeError> {
        if self.scopes.current_kind() == FrameKind::Function
            && self.types.function_type(name).is_some()
        {
            return Err(self.raise_known(
                KnownException::NamespaceConflict,
                format!("Variable '{}' conflicts with a function of the same name.", name),
            ));
        }
        self.check_var_type_conflict(name)
    }

    /// A capitalized variable name may not shadow a visible type
    fn check_var_type_conflict(&mut self, name: &str) -> Result<(), RuntimeError> {
        let capitalized = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let is_type = matches!(
            self.types.lookup(name),
            Some(Type::Class(_) | Type::Enum(_))
        );
        if capitalized && is_type {
            return Err(self.raise_known(
                KnownException::NamespaceConflict,
                format!("Variable '{}' conflicts with a type of the same name.", name),
            ));
        }
        Ok(())
    }

    pub(crate) fn execute_function_decl(&mut self, decl: &Rc<FunctionDecl>) -> Result<(), RuntimeError> {
        let return_type = match &decl.return_type {
            Some(name) => self.resolve_type(name)?,
            None => Type::Any,
        };
        self.check_visibility(&return_type)?;

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = self.resolve_type(&param.param_type)?;
            if ty == Type::Void {
                return Err(RuntimeError::VoidParameter {
                    function: decl.name.clone(),
                    name: param.name.clone(),
                    location: decl.location,
                });
            }
            self.check_visibility(&ty)?;
            self.check_var_type_conflict(&param.name)?;
            params.push((param.name.clone(), ty));
        }

        if self.types.lookup(&decl.name).is_some() {
            return Err(self.raise_known(
                KnownException::NamespaceConflict,
                format!("Function '{}' conflicts with an existing type.", decl.name),
            ));
        }
        let id = self.functions.len();
        let binding = Variable::new(Type::Function(id), Value::Function(id));
        if let Err(e) = self.scopes.add_global(&decl.name, binding) {
            return Err(self.raise_known(KnownException::NamespaceConflict, e.to_string()));
        }
        if let Err(e) = self.types.add_function_type(&decl.name, id) {
            return Err(self.raise_known(KnownException::NamespaceConflict, e.to_string()));
        }
        self.functions.push(FunctionDef {
            decl: Rc::clone(decl),
            return_type,
            params,
        });
        debug!(function = %decl.name, id, "declared function");
        Ok(())
    }

    pub(crate) fn execute_class_decl(
        &mut self,
        name: &str,
        parent: Option<&TypeName>,
        visibility: Visibility,
    ) -> Result<(), RuntimeError> {
        let parent = match parent {
            Some(parent_name) => match self.resolve_type(parent_name)? {
                Type::Class(id) => Some(id),
                _ => {
                    return Err(self.raise_known(
                        KnownException::TypeIncompatible,
                        format!("'{}' cannot extend non-class type '{}'.", name, parent_name),
                    ))
                }
            },
            None => None,
        };
        if let Some(parent) = parent {
            self.check_visibility(&Type::Class(parent))?;
        }
        let module = self.module.clone();
        match self.types.add_class(name, parent, &module, visibility) {
            Ok(id) => {
                debug!(class = name, id, "declared class");
                Ok(())
            }
            Err(e) => Err(self.raise_known(KnownException::NamespaceConflict, e.to_string())),
        }
    }

    pub(crate) fn execute_enum_decl(
        &mut self,
        name: &str,
        literals: &[String],
    ) -> Result<(), RuntimeError> {
        let module = self.module.clone();
        match self.types.add_enum(name, literals.to_vec(), &module) {
            Ok(id) => {
                debug!(enum_name = name, id, "declared enum");
                Ok(())
            }
            Err(e) => Err(self.raise_known(KnownException::NamespaceConflict, e.to_string())),
        }
    }
}
