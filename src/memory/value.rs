//! Runtime value representation
//!
//! [`Value`] is the tagged representation of everything a script can hold in a
//! variable. Primitive values are stored inline; objects, arrays, lists and
//! locks live on the [`Heap`](super::heap::Heap) and are referenced through an
//! [`ObjRef`].
//!
//! Copying a `Value` therefore copies primitives and strings, but two copies of
//! an `Object` still point at the same heap object.

use crate::interpreter::type_system::{EnumId, FunctionId, Type};
use std::fmt;

/// Handle of an object on the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub usize);

/// Enum constant: the enum's id, the literal's position and its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub enum_id: EnumId,
    pub ordinal: usize,
    pub literal: String,
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Produced by calls to functions without a result
    Void,
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Char(char),
    Str(String),
    Object(ObjRef),
    Enum(EnumValue),
    /// Result of `typeof(T)`
    Type(Type),
    Function(FunctionId),
}

impl Value {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(c) => Some(*c as i32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjRef> {
        match self {
            Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Script-level equality: primitives by value, strings by content,
    /// objects by identity. `int` and `char` compare numerically.
    pub fn script_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(_) | Value::Char(_), Value::Int(_) | Value::Char(_)) => {
                self.as_int() == other.as_int()
            }
            (Value::Enum(a), Value::Enum(b)) => a.enum_id == b.enum_id && a.ordinal == b.ordinal,
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(r) => write!(f, "<object #{}>", r.0),
            Value::Enum(e) => write!(f, "{}", e.literal),
            Value::Type(t) => write!(f, "<type {:?}>", t),
            Value::Function(id) => write!(f, "<function #{}>", id),
        }
    }
}
