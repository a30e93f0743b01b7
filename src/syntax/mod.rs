//! Syntax trees for the scripting language
//!
//! - [`ast`]: statement, expression and type-name nodes, each carrying a
//!   [`ast::SourceLocation`]
//! - [`build`]: helper constructors for assembling trees without a parser

pub mod ast;
pub mod build;
