//! q Language resolved AST
//!
//! This crate defines the tree a parser and resolver hand to a code
//! generation backend: node kinds, parent links, semantic-type and binding
//! annotations, plus a builder for constructing trees programmatically and
//! JSON (de)serialization for exchanging them between tools.

pub mod ast;
pub mod builder;
pub mod error;
pub mod span;

// Re-export core types
pub use ast::*;
pub use builder::AstBuilder;
pub use error::{AstError, Result};
pub use span::{ByteOffset, FileId, Span};
