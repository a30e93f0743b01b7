//! Object heap
//!
//! Objects are never freed; the heap lives as long as its interpreter. Each
//! object records its runtime [`Type`] plus kind-specific state:
//!
//! - plain class instances with named fields
//! - exceptions with their message
//! - arrays with a fixed element type
//! - lists, which count the iteration views currently open on them
//! - locks, which count nested acquisitions

use super::value::{ObjRef, Value};
use crate::interpreter::type_system::Type;
use rustc_hash::FxHashMap;

/// Iteration state of a list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub items: Vec<Value>,
    /// Views currently iterating; the list rejects modification while > 0
    pub active_views: usize,
    pub views_opened: u64,
    pub views_closed: u64,
}

/// State of a `System.Concurrency.Lock`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockState {
    /// Re-entrant hold count
    pub depth: u32,
    pub acquisitions: u64,
    pub releases: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Plain { fields: FxHashMap<String, Value> },
    Exception { message: String },
    Array { element_type: Type, items: Vec<Value> },
    List(ListState),
    Lock(LockState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeapObject {
    pub object_type: Type,
    pub data: ObjectData,
}

#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            objects: Vec::new(),
        }
    }

    pub fn allocate(&mut self, object_type: Type, data: ObjectData) -> ObjRef {
        self.objects.push(HeapObject { object_type, data });
        ObjRef(self.objects.len() - 1)
    }

    pub fn get(&self, obj: ObjRef) -> Option<&HeapObject> {
        self.objects.get(obj.0)
    }

    pub fn get_mut(&mut self, obj: ObjRef) -> Option<&mut HeapObject> {
        self.objects.get_mut(obj.0)
    }

    pub fn type_of(&self, obj: ObjRef) -> Option<&Type> {
        self.get(obj).map(|o| &o.object_type)
    }

    pub fn list(&self, obj: ObjRef) -> Option<&ListState> {
        match self.get(obj).map(|o| &o.data) {
            Some(ObjectData::List(state)) => Some(state),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, obj: ObjRef) -> Option<&mut ListState> {
        match self.get_mut(obj).map(|o| &mut o.data) {
            Some(ObjectData::List(state)) => Some(state),
            _ => None,
        }
    }

    pub fn lock(&self, obj: ObjRef) -> Option<&LockState> {
        match self.get(obj).map(|o| &o.data) {
            Some(ObjectData::Lock(state)) => Some(state),
            _ => None,
        }
    }

    pub fn lock_mut(&mut self, obj: ObjRef) -> Option<&mut LockState> {
        match self.get_mut(obj).map(|o| &mut o.data) {
            Some(ObjectData::Lock(state)) => Some(state),
            _ => None,
        }
    }

    /// Message of an exception object
    pub fn exception_message(&self, obj: ObjRef) -> Option<&str> {
        match self.get(obj).map(|o| &o.data) {
            Some(ObjectData::Exception { message }) => Some(message),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
