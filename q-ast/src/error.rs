//! AST loading and integrity errors

use crate::ast::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AstError>;

#[derive(Error, Debug)]
pub enum AstError {
    #[error("Node {node} references {reference} which is outside the arena of {len} nodes")]
    DanglingReference {
        node: NodeId,
        reference: NodeId,
        len: usize,
    },

    #[error("Root {root} is not a Root node (found {found})")]
    InvalidRoot { root: NodeId, found: &'static str },

    #[error("Node {node} is owned by both {first} and {second}")]
    SharedChild {
        node: NodeId,
        first: NodeId,
        second: NodeId,
    },

    #[error("Node {node} is its own ancestor")]
    Cycle { node: NodeId },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
