//! Variable table: call frames with nested lexical scopes
//!
//! The table is a stack of [`Frame`]s. The bottom frame is the global frame;
//! every function call pushes a frame of its own. Each frame tracks the names
//! declared in each of its open scopes so that leaving a scope drops exactly
//! the bindings it introduced.
//!
//! Name resolution looks at the current frame first and then at the global
//! frame's outermost scope, which is where global functions and top-level
//! variables live. A name may not be declared twice while both bindings are
//! visible inside the same frame.

use crate::interpreter::type_system::Type;
use crate::memory::value::Value;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// A named, typed binding
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub var_type: Type,
    pub value: Value,
}

impl Variable {
    pub fn new(var_type: Type, value: Value) -> Self {
        Variable { var_type, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("'{0}' is already defined in this scope")]
    AlreadyDefined(String),
}

/// Execution frame: the global program or one function invocation
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    pub name: String,
    locals: FxHashMap<String, Variable>,
    // Names declared per scope; index 0 is the frame's base scope
    scope_stack: Vec<Vec<String>>,
}

impl Frame {
    fn new(kind: FrameKind, name: String) -> Self {
        Frame {
            kind,
            name,
            locals: FxHashMap::default(),
            scope_stack: vec![Vec::new()],
        }
    }

    fn declare(&mut self, name: &str, var: Variable) -> Result<(), ScopeError> {
        if self.locals.contains_key(name) {
            return Err(ScopeError::AlreadyDefined(name.to_string()));
        }
        self.locals.insert(name.to_string(), var);
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.push(name.to_string());
        }
        Ok(())
    }

    fn push_scope(&mut self) {
        self.scope_stack.push(Vec::new());
    }

    fn pop_scope(&mut self) -> bool {
        // The base scope lives as long as the frame
        if self.scope_stack.len() <= 1 {
            return false;
        }
        if let Some(declared) = self.scope_stack.pop() {
            for name in declared {
                self.locals.remove(&name);
            }
        }
        true
    }
}

/// The frame stack
#[derive(Debug, Clone)]
pub struct VarTable {
    frames: Vec<Frame>,
}

impl VarTable {
    pub fn new() -> Self {
        VarTable {
            frames: vec![Frame::new(FrameKind::Global, "<global>".to_string())],
        }
    }

    fn current(&self) -> &Frame {
        // frames[0] is never popped
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Enter a new scope in the current frame
    pub fn enter_scope(&mut self) {
        self.current_mut().push_scope();
    }

    /// Exit the innermost scope of the current frame, discarding its bindings.
    /// Returns false if only the frame's base scope was left.
    pub fn exit_scope(&mut self) -> bool {
        self.current_mut().pop_scope()
    }

    /// Number of open scopes in the current frame, the base scope included
    pub fn scope_depth(&self) -> usize {
        self.current().scope_stack.len()
    }

    pub fn push_frame(&mut self, name: &str) {
        self.frames
            .push(Frame::new(FrameKind::Function, name.to_string()));
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of function frames above the global frame
    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn current_kind(&self) -> FrameKind {
        self.current().kind
    }

    /// Declare a variable in the innermost scope of the current frame
    pub fn add_variable(&mut self, name: &str, var: Variable) -> Result<(), ScopeError> {
        self.current_mut().declare(name, var)
    }

    /// Declare a variable in the global frame's base scope
    pub fn add_global(&mut self, name: &str, var: Variable) -> Result<(), ScopeError> {
        let global = &mut self.frames[0];
        if global.locals.contains_key(name) {
            return Err(ScopeError::AlreadyDefined(name.to_string()));
        }
        global.locals.insert(name.to_string(), var);
        global.scope_stack[0].push(name.to_string());
        Ok(())
    }

    /// Look a name up in the current frame, then among globals
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.current()
            .locals
            .get(name)
            .or_else(|| self.global_binding(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let last = self.frames.len() - 1;
        if self.frames[last].locals.contains_key(name) {
            return self.frames[last].locals.get_mut(name);
        }
        if last == 0 {
            return None;
        }
        let global = &mut self.frames[0];
        if global.scope_stack[0].iter().any(|n| n == name) {
            global.locals.get_mut(name)
        } else {
            None
        }
    }

    fn global_binding(&self, name: &str) -> Option<&Variable> {
        if self.frames.len() == 1 {
            return None;
        }
        let global = &self.frames[0];
        if global.scope_stack[0].iter().any(|n| n == name) {
            global.locals.get(name)
        } else {
            None
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl Default for VarTable {
    fn default() -> Self {
        Self::new()
    }
}
