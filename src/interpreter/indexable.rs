//! Iteration views for `for`-each loops
//!
//! A view walks an indexable value (array, list or string) by position. The
//! length is read again on every step, so the view reflects the source as it
//! is now. Lists count their open views and reject modification while any
//! is open; [`Indexable::dispose`] closes the view and must run exactly once.

use crate::interpreter::builtins::KnownException;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::heap::{Heap, ObjectData};
use crate::memory::value::{ObjRef, Value};

pub trait Indexable {
    /// Current length of the underlying value
    fn length(&self, heap: &Heap) -> usize;

    /// Position of the next element
    fn position(&self) -> usize;

    /// Element at the current position, if any
    fn current(&self, heap: &Heap) -> Option<Value>;

    fn advance(&mut self);

    /// Release the view; the underlying value becomes modifiable again
    fn dispose(&mut self, heap: &mut Heap);

    fn has_next(&self, heap: &Heap) -> bool {
        self.position() < self.length(heap)
    }
}

struct ArrayView {
    array: ObjRef,
    index: usize,
}

impl ArrayView {
    fn items<'h>(&self, heap: &'h Heap) -> &'h [Value] {
        match heap.get(self.array).map(|o| &o.data) {
            Some(ObjectData::Array { items, .. }) => items,
            _ => &[],
        }
    }
}

impl Indexable for ArrayView {
    fn length(&self, heap: &Heap) -> usize {
        self.items(heap).len()
    }

    fn position(&self) -> usize {
        self.index
    }

    fn current(&self, heap: &Heap) -> Option<Value> {
        self.items(heap).get(self.index).cloned()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn dispose(&mut self, _heap: &mut Heap) {}
}

struct StringView {
    chars: Vec<char>,
    index: usize,
}

impl Indexable for StringView {
    fn length(&self, _heap: &Heap) -> usize {
        self.chars.len()
    }

    fn position(&self) -> usize {
        self.index
    }

    fn current(&self, _heap: &Heap) -> Option<Value> {
        self.chars.get(self.index).map(|c| Value::Char(*c))
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn dispose(&mut self, _heap: &mut Heap) {}
}

struct ListView {
    list: ObjRef,
    index: usize,
    open: bool,
}

impl Indexable for ListView {
    fn length(&self, heap: &Heap) -> usize {
        heap.list(self.list).map_or(0, |l| l.items.len())
    }

    fn position(&self) -> usize {
        self.index
    }

    fn current(&self, heap: &Heap) -> Option<Value> {
        heap.list(self.list)
            .and_then(|l| l.items.get(self.index))
            .cloned()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn dispose(&mut self, heap: &mut Heap) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Some(list) = heap.list_mut(self.list) {
            list.active_views = list.active_views.saturating_sub(1);
            list.views_closed += 1;
        }
    }
}

impl Interpreter {
    /// Open a view over a value, raising if the value cannot be iterated
    pub(crate) fn acquire_indexable(
        &mut self,
        source: Value,
    ) -> Result<Box<dyn Indexable>, RuntimeError> {
        let obj = match source {
            Value::Str(s) => {
                return Ok(Box::new(StringView {
                    chars: s.chars().collect(),
                    index: 0,
                }))
            }
            Value::Object(obj) => obj,
            Value::Null => {
                return Err(self.raise_known(
                    KnownException::NullReference,
                    "Cannot iterate over a null value.",
                ))
            }
            other => return Err(self.not_iterable(&other)),
        };

        if let Some(list) = self.heap.list_mut(obj) {
            list.active_views += 1;
            list.views_opened += 1;
            return Ok(Box::new(ListView {
                list: obj,
                index: 0,
                open: true,
            }));
        }
        match self.heap.get(obj).map(|o| &o.data) {
            Some(ObjectData::Array { .. }) => Ok(Box::new(ArrayView {
                array: obj,
                index: 0,
            })),
            _ => Err(self.not_iterable(&Value::Object(obj))),
        }
    }

    fn not_iterable(&mut self, value: &Value) -> RuntimeError {
        let type_name = self.types.type_name(&self.runtime_type(value));
        self.raise_known(
            KnownException::RuntimeCheck,
            format!("A value of type '{}' cannot be iterated.", type_name),
        )
    }
}
