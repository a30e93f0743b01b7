//! Type table and type compatibility
//!
//! The [`TypeTable`] holds every class, enum and function type known to an
//! interpreter. Built-in classes are registered by
//! [`register_builtins`](super::builtins::register_builtins) when the
//! interpreter starts; scripts add their own through declarations.
//!
//! # Compatibility Rules
//!
//! - `var` (untyped) accepts anything except void
//! - `char` widens to `int`; no other primitive conversions happen
//! - `null` is accepted by strings, classes, arrays and enums
//! - an object is accepted by its own class and every ancestor class
//! - arrays are accepted when element types match exactly

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::syntax::ast::{TypeName, Visibility};
use rustc_hash::FxHashMap;
use thiserror::Error;

pub type ClassId = usize;
pub type EnumId = usize;
pub type FunctionId = usize;

/// Resolved runtime type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// Untyped (`var`)
    Any,
    Null,
    Bool,
    Int,
    Char,
    Str,
    Array(Box<Type>),
    Class(ClassId),
    Enum(EnumId),
    Function(FunctionId),
    /// Type of the values produced by `typeof(T)`
    TypeObject,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub parent: Option<ClassId>,
    pub module: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub name: String,
    pub literals: Vec<String>,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeTableError {
    #[error("type '{0}' is already defined")]
    Duplicate(String),
}

#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    classes: Vec<ClassInfo>,
    enums: Vec<EnumInfo>,
    names: FxHashMap<String, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(
        &mut self,
        name: &str,
        parent: Option<ClassId>,
        module: &str,
        visibility: Visibility,
    ) -> Result<ClassId, TypeTableError> {
        self.check_free(name)?;
        let id = self.classes.len();
        self.classes.push(ClassInfo {
            name: name.to_string(),
            parent,
            module: module.to_string(),
            visibility,
        });
        self.names.insert(name.to_string(), Type::Class(id));
        Ok(id)
    }

    pub fn add_enum(
        &mut self,
        name: &str,
        literals: Vec<String>,
        module: &str,
    ) -> Result<EnumId, TypeTableError> {
        self.check_free(name)?;
        let id = self.enums.len();
        self.enums.push(EnumInfo {
            name: name.to_string(),
            literals,
            module: module.to_string(),
        });
        self.names.insert(name.to_string(), Type::Enum(id));
        Ok(id)
    }

    /// Register a class supplied by the runtime itself. Replaces any
    /// previous definition of the same name.
    pub(crate) fn define_builtin(&mut self, name: &str, parent: Option<ClassId>) -> ClassId {
        let id = self.classes.len();
        self.classes.push(ClassInfo {
            name: name.to_string(),
            parent,
            module: "System".to_string(),
            visibility: Visibility::Public,
        });
        self.names.insert(name.to_string(), Type::Class(id));
        id
    }

    /// Register the type of a global function under its name
    pub fn add_function_type(&mut self, name: &str, id: FunctionId) -> Result<(), TypeTableError> {
        self.check_free(name)?;
        self.names.insert(name.to_string(), Type::Function(id));
        Ok(())
    }

    fn check_free(&self, name: &str) -> Result<(), TypeTableError> {
        if self.names.contains_key(name) {
            Err(TypeTableError::Duplicate(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Look up a class, enum or function type by its full name
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.names.get(name)
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        match self.names.get(name) {
            Some(Type::Class(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn function_type(&self, name: &str) -> Option<FunctionId> {
        match self.names.get(name) {
            Some(Type::Function(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id)
    }

    pub fn enum_info(&self, id: EnumId) -> Option<&EnumInfo> {
        self.enums.get(id)
    }

    /// Resolve a source-level type name. `None` if a named type is unknown.
    pub fn resolve(&self, name: &TypeName) -> Option<Type> {
        match name {
            TypeName::Var => Some(Type::Any),
            TypeName::Void => Some(Type::Void),
            TypeName::Bool => Some(Type::Bool),
            TypeName::Int => Some(Type::Int),
            TypeName::Char => Some(Type::Char),
            TypeName::String => Some(Type::Str),
            TypeName::Named(n) => match self.names.get(n) {
                Some(ty @ (Type::Class(_) | Type::Enum(_))) => Some(ty.clone()),
                _ => None,
            },
            TypeName::Array(element) => self
                .resolve(element)
                .map(|ty| Type::Array(Box::new(ty))),
        }
    }

    /// True if `class` is `ancestor` or inherits from it
    pub fn is_derived_from(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.classes.get(id).and_then(|c| c.parent);
        }
        false
    }

    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Any => "var".to_string(),
            Type::Null => "null".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Int => "int".to_string(),
            Type::Char => "char".to_string(),
            Type::Str => "string".to_string(),
            Type::Array(element) => format!("{}[]", self.type_name(element)),
            Type::Class(id) => self
                .class(*id)
                .map_or_else(|| format!("<class #{}>", id), |c| c.name.clone()),
            Type::Enum(id) => self
                .enum_info(*id)
                .map_or_else(|| format!("<enum #{}>", id), |e| e.name.clone()),
            Type::Function(_) => "Function".to_string(),
            Type::TypeObject => "System.Type".to_string(),
        }
    }

    /// Value a freshly declared variable of this type holds
    pub fn default_value(&self, ty: &Type) -> Value {
        match ty {
            Type::Bool => Value::Bool(false),
            Type::Int => Value::Int(0),
            Type::Char => Value::Char('\0'),
            Type::Str => Value::Str(String::new()),
            _ => Value::Null,
        }
    }
}

impl Interpreter {
    /// Runtime type of a value
    pub(crate) fn runtime_type(&self, value: &Value) -> Type {
        match value {
            Value::Void => Type::Void,
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Char(_) => Type::Char,
            Value::Str(_) => Type::Str,
            Value::Object(obj) => self.heap.type_of(*obj).cloned().unwrap_or(Type::Null),
            Value::Enum(e) => Type::Enum(e.enum_id),
            Value::Type(_) => Type::TypeObject,
            Value::Function(id) => Type::Function(*id),
        }
    }

    /// Convert a value for storage in a slot of type `target`.
    /// Returns `None` if the value is not assignable.
    pub(crate) fn coerce(&self, value: Value, target: &Type) -> Option<Value> {
        if value.is_void() {
            return None;
        }
        let actual = self.runtime_type(&value);
        let accepted = match (target, &actual) {
            (Type::Any, _) => true,
            (Type::Int, Type::Char) => return value.as_int().map(Value::Int),
            (Type::Str | Type::Class(_) | Type::Array(_) | Type::Enum(_), Type::Null) => true,
            (Type::Class(expected), Type::Class(found)) => {
                self.types.is_derived_from(*found, *expected)
            }
            (expected, found) => expected == found,
        };
        accepted.then_some(value)
    }

    /// Raise `System.IllegalAccessException` if an internal class is used
    /// outside its module.
    pub(crate) fn check_visibility(&mut self, ty: &Type) -> Result<(), RuntimeError> {
        let mut ty = ty;
        while let Type::Array(element) = ty {
            ty = element.as_ref();
        }
        let Type::Class(id) = ty else {
            return Ok(());
        };
        let hidden = self
            .types
            .class(*id)
            .filter(|c| c.visibility == Visibility::Internal && c.module != self.module)
            .map(|c| (c.name.clone(), c.module.clone()));
        match hidden {
            Some((name, module)) => Err(self.raise_known(
                super::builtins::KnownException::IllegalAccess,
                format!(
                    "Type '{}' is internal to module '{}' and cannot be accessed from module '{}'.",
                    name, module, self.module
                ),
            )),
            None => Ok(()),
        }
    }

    /// Resolve a type name, raising `System.UndefinedSymbolException` if unknown
    pub(crate) fn resolve_type(&mut self, name: &TypeName) -> Result<Type, RuntimeError> {
        match self.types.resolve(name) {
            Some(ty) => Ok(ty),
            None => Err(self.raise_known(
                super::builtins::KnownException::UndefinedSymbol,
                format!("Unknown type: {}", name),
            )),
        }
    }
}
