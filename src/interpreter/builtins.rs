//! Built-in classes and their native methods
//!
//! This module registers the classes the runtime itself depends on and
//! implements the methods of the ones that carry native state.
//!
//! # Built-in Classes
//!
//! - `System.Exception` and the exception classes raised by the runtime
//!   (see [`KnownException`])
//! - `System.Concurrency.Lock`: re-entrant lock with `lock()` / `unlock()`
//! - `System.Collection.List`: growable list with `add`, `get`, `set`,
//!   `size` and `remove`. While a `for`-each loop iterates a list, the list
//!   rejects modification with `System.Collection.ConcurrentModificationException`.
//!
//! Exceptions also answer `getMessage()`.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, ScriptException};
use crate::interpreter::type_system::{ClassId, Type, TypeTable};
use crate::memory::heap::{ListState, LockState, ObjectData};
use crate::memory::value::{ObjRef, Value};
use rustc_hash::FxHashMap;
use tracing::trace;

pub const EXCEPTION_CLASS: &str = "System.Exception";
pub const LOCK_CLASS: &str = "System.Concurrency.Lock";
pub const LIST_CLASS: &str = "System.Collection.List";

/// Only this exception is fatal; catch clauses never see it
const FATAL_EXCEPTION_CLASS: &str = "System.StackOverflowException";

/// Exceptions raised by the runtime itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownException {
    RuntimeCheck,
    NullReference,
    UndefinedSymbol,
    TypeIncompatible,
    IllegalAccess,
    Arithmetic,
    ArrayOutOfRange,
    NamespaceConflict,
    ConcurrentModification,
    LockState,
    StackOverflow,
}

impl KnownException {
    pub const ALL: [KnownException; 11] = [
        KnownException::RuntimeCheck,
        KnownException::NullReference,
        KnownException::UndefinedSymbol,
        KnownException::TypeIncompatible,
        KnownException::IllegalAccess,
        KnownException::Arithmetic,
        KnownException::ArrayOutOfRange,
        KnownException::NamespaceConflict,
        KnownException::ConcurrentModification,
        KnownException::LockState,
        KnownException::StackOverflow,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            KnownException::RuntimeCheck => "System.RuntimeCheckException",
            KnownException::NullReference => "System.NullReferenceException",
            KnownException::UndefinedSymbol => "System.UndefinedSymbolException",
            KnownException::TypeIncompatible => "System.TypeIncompatibleException",
            KnownException::IllegalAccess => "System.IllegalAccessException",
            KnownException::Arithmetic => "System.ArithmeticException",
            KnownException::ArrayOutOfRange => "System.ArrayOutOfRangeException",
            KnownException::NamespaceConflict => "System.Lang.NamespaceConflictException",
            KnownException::ConcurrentModification => {
                "System.Collection.ConcurrentModificationException"
            }
            KnownException::LockState => "System.Concurrency.LockStateException",
            KnownException::StackOverflow => FATAL_EXCEPTION_CLASS,
        }
    }
}

/// Ids of the built-in classes
#[derive(Debug, Clone)]
pub struct BuiltinClasses {
    pub exception: ClassId,
    pub lock: ClassId,
    pub list: ClassId,
    known: FxHashMap<KnownException, ClassId>,
}

impl BuiltinClasses {
    pub fn known(&self, kind: KnownException) -> ClassId {
        self.known.get(&kind).copied().unwrap_or(self.exception)
    }
}

pub(crate) fn register_builtins(types: &mut TypeTable) -> BuiltinClasses {
    let exception = types.define_builtin(EXCEPTION_CLASS, None);
    let known = KnownException::ALL
        .iter()
        .map(|kind| (*kind, types.define_builtin(kind.class_name(), Some(exception))))
        .collect();
    BuiltinClasses {
        exception,
        lock: types.define_builtin(LOCK_CLASS, None),
        list: types.define_builtin(LIST_CLASS, None),
        known,
    }
}

impl Interpreter {
    /// Allocate an exception of a runtime-defined class and wrap it as an error
    pub(crate) fn raise_known(
        &mut self,
        kind: KnownException,
        message: impl Into<String>,
    ) -> RuntimeError {
        let class_id = self.builtins.known(kind);
        let message = message.into();
        let object = self.heap.allocate(
            Type::Class(class_id),
            ObjectData::Exception {
                message: message.clone(),
            },
        );
        trace!(class = kind.class_name(), %message, "raising runtime exception");
        RuntimeError::Exception(Box::new(ScriptException {
            object,
            class_id,
            class_name: kind.class_name().to_string(),
            message,
            fatal: kind == KnownException::StackOverflow,
            source: None,
        }))
    }

    pub(crate) fn is_exception_class(&self, class_id: ClassId) -> bool {
        self.types.is_derived_from(class_id, self.builtins.exception)
    }

    /// Wrap a thrown value. Only non-null instances of exception classes can be thrown.
    pub(crate) fn exception_from_value(
        &mut self,
        value: Value,
    ) -> Result<ScriptException, RuntimeError> {
        let obj = match value {
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    "Trying to throw a null object.",
                ))
            }
            other => {
                let type_name = self.types.type_name(&self.runtime_type(&other));
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!("Trying to throw a value of type '{}'.", type_name),
                ));
            }
        };
        let class_id = match self.heap.type_of(obj) {
            Some(Type::Class(id)) if self.is_exception_class(*id) => *id,
            _ => {
                let type_name = self.types.type_name(&self.runtime_type(&Value::Object(obj)));
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!(
                        "Trying to throw an object of type '{}', which is not derived from {}.",
                        type_name, EXCEPTION_CLASS
                    ),
                ));
            }
        };
        let class_name = self
            .types
            .class(class_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let message = self
            .heap
            .exception_message(obj)
            .unwrap_or_default()
            .to_string();
        Ok(ScriptException {
            object: obj,
            class_id,
            fatal: class_name == FATAL_EXCEPTION_CLASS,
            class_name,
            message,
            source: None,
        })
    }

    /// Instantiate a class with `new`
    pub(crate) fn construct_object(
        &mut self,
        class_id: ClassId,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let data = if self.is_exception_class(class_id) {
            let message = match args.as_slice() {
                [] => String::new(),
                [Value::Str(message)] => message.clone(),
                _ => {
                    return Err(self.raise_known(
                        KnownException::RuntimeCheck,
                        "An exception takes a single string message.",
                    ))
                }
            };
            ObjectData::Exception { message }
        } else {
            if !args.is_empty() {
                let name = self.types.type_name(&Type::Class(class_id));
                return Err(self.raise_known(
                    KnownException::RuntimeCheck,
                    format!("No constructor of '{}' takes {} argument(s).", name, args.len()),
                ));
            }
            if class_id == self.builtins.lock {
                ObjectData::Lock(LockState::default())
            } else if class_id == self.builtins.list {
                ObjectData::List(ListState::default())
            } else {
                ObjectData::Plain {
                    fields: FxHashMap::default(),
                }
            }
        };
        Ok(Value::Object(self.heap.allocate(Type::Class(class_id), data)))
    }

    /// Methods implemented by the runtime
    pub(crate) fn call_native_method(
        &mut self,
        obj: ObjRef,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if self.heap.lock(obj).is_some() {
            return self.lock_method(obj, method, &args);
        }
        if self.heap.list(obj).is_some() {
            return self.list_method(obj, method, args);
        }
        if let (Some(message), "getMessage", true) =
            (self.heap.exception_message(obj), method, args.is_empty())
        {
            return Ok(Value::Str(message.to_string()));
        }
        let type_name = self.types.type_name(&self.runtime_type(&Value::Object(obj)));
        Err(self.raise_known(
            KnownException::UndefinedSymbol,
            format!("Type '{}' has no method '{}'.", type_name, method),
        ))
    }

    fn lock_method(
        &mut self,
        obj: ObjRef,
        method: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        if !args.is_empty() {
            return Err(self.raise_known(
                KnownException::RuntimeCheck,
                format!("Lock.{}() takes no arguments.", method),
            ));
        }
        let Some(state) = self.heap.lock_mut(obj) else {
            return Err(self.raise_known(KnownException::NullReference, "Lock is gone."));
        };
        match method {
            "lock" => {
                state.depth += 1;
                state.acquisitions += 1;
                Ok(Value::Void)
            }
            "unlock" if state.depth > 0 => {
                state.depth -= 1;
                state.releases += 1;
                Ok(Value::Void)
            }
            "unlock" => Err(self.raise_known(
                KnownException::LockState,
                "Trying to unlock a lock that is not held.",
            )),
            _ => Err(self.raise_known(
                KnownException::UndefinedSymbol,
                format!("Type '{}' has no method '{}'.", LOCK_CLASS, method),
            )),
        }
    }

    fn list_method(
        &mut self,
        obj: ObjRef,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let (len, active_views) = match self.heap.list(obj) {
            Some(list) => (list.items.len(), list.active_views),
            None => return Err(self.raise_known(KnownException::NullReference, "List is gone.")),
        };
        let modifies = matches!(method, "add" | "set" | "remove");
        if modifies && active_views > 0 {
            return Err(self.raise_known(
                KnownException::ConcurrentModification,
                "The list cannot be modified while it is being iterated.",
            ));
        }

        let mut args = args.into_iter();
        let (first, second, extra) = (args.next(), args.next(), args.next());
        if extra.is_some() {
            return Err(self.raise_known(
                KnownException::RuntimeCheck,
                format!("Too many arguments for List.{}().", method),
            ));
        }
        let index = match (method, &first) {
            ("get" | "set" | "remove", Some(Value::Int(i))) if *i >= 0 && (*i as usize) < len => {
                Some(*i as usize)
            }
            ("get" | "set" | "remove", Some(Value::Int(i))) => {
                return Err(self.raise_known(
                    KnownException::ArrayOutOfRange,
                    format!("Index {} is out of range for a list of size {}.", i, len),
                ))
            }
            _ => None,
        };

        let Some(list) = self.heap.list_mut(obj) else {
            return Err(self.raise_known(KnownException::NullReference, "List is gone."));
        };
        match (method, first, second, index) {
            ("add", Some(value), None, _) if !value.is_void() => {
                list.items.push(value);
                Ok(Value::Void)
            }
            ("size", None, None, _) => Ok(Value::Int(list.items.len() as i32)),
            ("get", _, None, Some(i)) => Ok(list.items[i].clone()),
            ("set", _, Some(value), Some(i)) if !value.is_void() => {
                list.items[i] = value;
                Ok(Value::Void)
            }
            ("remove", _, None, Some(i)) => Ok(list.items.remove(i)),
            _ => Err(self.raise_known(
                KnownException::RuntimeCheck,
                format!("Invalid call to List.{}().", method),
            )),
        }
    }
}
