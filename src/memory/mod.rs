//! Memory model for the interpreter
//!
//! - [`value`]: runtime value representation
//! - [`scope`]: variable table with call frames and nested scopes
//! - [`heap`]: objects, arrays, lists and locks referenced by [`value::ObjRef`]

pub mod heap;
pub mod scope;
pub mod value;
