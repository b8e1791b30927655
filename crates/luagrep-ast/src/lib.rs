//! luagrep AST - Core types for the Lua syntax tree
//!
//! This crate defines the statement and expression nodes produced by the
//! parser, source spans, and the wildcard variants that only templates carry.

mod span;
mod expr;
mod stmt;

pub use span::*;
pub use expr::*;
pub use stmt::*;
