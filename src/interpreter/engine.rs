// Execution engine for the scripting language

use crate::config::EngineConfig;
use crate::interpreter::builtins::{register_builtins, BuiltinClasses, KnownException};
use crate::interpreter::cancellation::{CancellationBudget, CancellationHandle};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::exit::{ExecResult, ExitCause, Outcome};
use crate::interpreter::options::StatementOption;
use crate::interpreter::section::ensure_stack;
use crate::interpreter::type_system::{ClassId, EnumId, FunctionId, Type, TypeTable};
use crate::memory::heap::Heap;
use crate::memory::scope::{FrameKind, VarTable, Variable};
use crate::memory::value::Value;
use crate::syntax::ast::{FunctionDecl, SourceLocation, Stmt, Visibility};
use std::rc::Rc;
use tracing::{debug, warn};

/// A declared function with its signature resolved
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub decl: Rc<FunctionDecl>,
    /// `Type::Any` for untyped functions
    pub return_type: Type,
    pub params: Vec<(String, Type)>,
}

impl FunctionDef {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Statements of the body; empty when the declaration had none
    pub fn body(&self) -> &[Stmt] {
        self.decl.body.as_deref().unwrap_or(&[])
    }
}

/// Executes statement trees against one variable table and heap.
///
/// An interpreter belongs to a single script thread. Other threads reach it
/// only through its [`CancellationHandle`].
pub struct Interpreter {
    pub(crate) config: EngineConfig,

    /// Classes, enums and function types
    pub(crate) types: TypeTable,

    pub(crate) builtins: BuiltinClasses,

    pub(crate) heap: Heap,

    /// Frames and scopes
    pub(crate) scopes: VarTable,

    /// Function definitions, indexed by `FunctionId`
    pub(crate) functions: Vec<FunctionDef>,

    /// Module that declared types belong to and visibility is checked against
    pub(crate) module: String,

    pub(crate) thread_name: String,

    pub(crate) cancellation: CancellationHandle,

    pub(crate) budget: CancellationBudget,
}

impl Interpreter {
    pub fn new(config: EngineConfig) -> Self {
        let mut types = TypeTable::new();
        let builtins = register_builtins(&mut types);
        Interpreter {
            module: config.module.clone(),
            budget: CancellationBudget::new(config.cancellation.clone()),
            config,
            types,
            builtins,
            heap: Heap::new(),
            scopes: VarTable::new(),
            functions: Vec::new(),
            thread_name: "main".to_string(),
            cancellation: CancellationHandle::new(),
        }
    }

    /// Name reported when the thread is aborted
    pub fn with_thread_name(mut self, name: &str) -> Self {
        self.thread_name = name.to_string();
        self
    }

    /// Share an existing cancellation flag instead of the interpreter's own
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancellation = handle;
        self
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// Run a program at the top level.
    ///
    /// An exception that escapes the program is not an error of the host: it
    /// completes with [`ExitCause::Faulted`] and the exception as the result.
    /// Structural errors and aborts are returned as `Err`.
    pub fn run(&mut self, program: &[Stmt]) -> Result<Outcome, RuntimeError> {
        self.run_with(program, &StatementOption::global())
    }

    /// Like [`run`](Self::run), but the result is the value of the last
    /// statement that produced one.
    pub fn evaluate(&mut self, program: &[Stmt]) -> Result<Outcome, RuntimeError> {
        self.run_with(program, &StatementOption::evaluation())
    }

    fn run_with(
        &mut self,
        program: &[Stmt],
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        debug!(statements = program.len(), thread = %self.thread_name, "running program");
        match self.execute(program, option) {
            Err(RuntimeError::Exception(exception)) => {
                warn!(%exception, "uncaught script exception");
                Ok(Outcome::new(
                    ExitCause::Faulted,
                    ExecResult::Exception(exception),
                ))
            }
            other => other,
        }
    }

    /// Execute a statement list with an explicit option, in the current scope
    pub fn execute(
        &mut self,
        statements: &[Stmt],
        option: &StatementOption,
    ) -> Result<Outcome, RuntimeError> {
        self.execute_statements(statements, option)
    }

    /// Call a global function by name from the host
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match self.scopes.lookup(name).map(|v| v.value.clone()) {
            Some(Value::Function(id)) => self.invoke_function(id, args, SourceLocation::default()),
            _ => Err(self.raise_known(
                KnownException::UndefinedSymbol,
                format!("Function '{}' is not defined.", name),
            )),
        }
    }

    /// Value of a variable visible from the current scope
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.scopes.lookup(name).map(|v| &v.value)
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Open scopes in the current frame
    pub fn scope_depth(&self) -> usize {
        self.scopes.scope_depth()
    }

    pub fn call_depth(&self) -> usize {
        self.scopes.call_depth()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Switch the module used for type declarations and visibility checks
    pub fn set_module(&mut self, module: &str) {
        self.module = module.to_string();
    }

    /// Register a class from the host
    pub fn register_class(
        &mut self,
        name: &str,
        parent: Option<&str>,
        module: &str,
        visibility: Visibility,
    ) -> Result<ClassId, RuntimeError> {
        let parent = match parent {
            Some(parent_name) => match self.types.class_id(parent_name) {
                Some(id) => Some(id),
                None => {
                    return Err(self.raise_known(
                        KnownException::UndefinedSymbol,
                        format!("Unknown parent class '{}'.", parent_name),
                    ))
                }
            },
            None => None,
        };
        self.types
            .add_class(name, parent, module, visibility)
            .map_err(|e| self.raise_known(KnownException::NamespaceConflict, e.to_string()))
    }

    /// Register an enum from the host
    pub fn register_enum(&mut self, name: &str, literals: &[&str]) -> Result<EnumId, RuntimeError> {
        let literals = literals.iter().map(|l| l.to_string()).collect();
        let module = self.module.clone();
        self.types
            .add_enum(name, literals, &module)
            .map_err(|e| self.raise_known(KnownException::NamespaceConflict, e.to_string()))
    }

    /// Invoke a declared function with already evaluated arguments
    pub(crate) fn invoke_function(
        &mut self,
        id: FunctionId,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some(function) = self.functions.get(id).cloned() else {
            return Err(self.raise_known(
                KnownException::UndefinedSymbol,
                format!("Function #{} is not defined.", id),
            ));
        };
        if args.len() != function.params.len() {
            return Err(self.raise_known(
                KnownException::RuntimeCheck,
                format!(
                    "Function '{}' expects {} argument(s) but got {}.",
                    function.name(),
                    function.params.len(),
                    args.len()
                ),
            ));
        }
        if self.scopes.call_depth() >= self.config.limits.max_call_depth {
            return Err(self.raise_known(
                KnownException::StackOverflow,
                format!(
                    "Call depth exceeded {} while calling '{}'.",
                    self.config.limits.max_call_depth,
                    function.name()
                ),
            ));
        }

        let mut bindings = Vec::with_capacity(args.len());
        for ((name, param_type), arg) in function.params.iter().zip(args) {
            let value = self.convert_for_slot(arg, param_type, name)?;
            bindings.push((name, Variable::new(param_type.clone(), value)));
        }

        debug!(function = function.name(), line = location.line, "calling function");
        self.scopes.push_frame(function.name());
        let outcome = ensure_stack(|| self.bind_and_execute(bindings, function.body()));
        self.scopes.pop_frame();

        let value = match outcome? {
            Outcome {
                cause: ExitCause::Returned,
                result: ExecResult::Value(value),
            } => value,
            _ => Value::Void,
        };
        match function.return_type {
            Type::Any | Type::Void => Ok(value),
            ref expected => self.convert_for_slot(value, expected, "return value"),
        }
    }

    fn bind_and_execute(
        &mut self,
        bindings: Vec<(&String, Variable)>,
        body: &[Stmt],
    ) -> Result<Outcome, RuntimeError> {
        debug_assert_eq!(self.scopes.current_kind(), FrameKind::Function);
        for (name, var) in bindings {
            if let Err(e) = self.scopes.add_variable(name, var) {
                return Err(self.raise_known(KnownException::NamespaceConflict, e.to_string()));
            }
        }
        self.execute_statements(body, &StatementOption::function_body())
    }

    /// Coerce a value into a typed slot, raising `System.TypeIncompatibleException`
    pub(crate) fn convert_for_slot(
        &mut self,
        value: Value,
        target: &Type,
        slot: &str,
    ) -> Result<Value, RuntimeError> {
        let found = self.runtime_type(&value);
        match self.coerce(value, target) {
            Some(converted) => Ok(converted),
            None => {
                let message = format!(
                    "Cannot assign a value of type '{}' to '{}' of type '{}'.",
                    self.types.type_name(&found),
                    slot,
                    self.types.type_name(target)
                );
                Err(self.raise_known(KnownException::TypeIncompatible, message))
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
