//! Rendering failures
//!
//! Every variant is a structural defect: either the resolver produced a tree
//! that breaks the input contract, or the backend met a combination it does
//! not render. Nothing here is recoverable, so rendering stops at the first
//! one and no partial output is produced.

use q_ast::{Ast, NodeId, Span};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{kind} node {node} at {span} cannot be rendered as {position}")]
    UnhandledNode {
        node: NodeId,
        kind: &'static str,
        position: &'static str,
        span: Span,
    },

    #[error("{construct} at {span} ({node}) resolves to {found}, which has no rendering")]
    UnhandledType {
        node: NodeId,
        construct: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("Var `{name}` {node} at {span} has no definition")]
    MissingDefinition { node: NodeId, name: String, span: Span },

    #[error("{kind} node {node} at {span} has no resolved type")]
    MissingResolution {
        node: NodeId,
        kind: &'static str,
        span: Span,
    },

    #[error("Macro `{name}` expects {expected} arguments but call {node} at {span} passes {found}")]
    MacroArity {
        node: NodeId,
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Call {node} at {span} to `{name}` has no receiver")]
    MissingReceiver { node: NodeId, name: String, span: Span },

    #[error("Macro `{name}` is expanded again inside its own expansion at call {node} at {span}")]
    RecursiveMacro { node: NodeId, name: String, span: Span },
}

impl RenderError {
    pub fn unhandled_node(ast: &Ast, node: NodeId, position: &'static str) -> Self {
        Self::UnhandledNode {
            node,
            kind: ast.kind(node).label(),
            position,
            span: ast.span(node),
        }
    }

    pub fn unhandled_type(ast: &Ast, node: NodeId, construct: &'static str, ty: NodeId) -> Self {
        Self::UnhandledType {
            node,
            construct,
            found: ast.kind(ty).label(),
            span: ast.span(node),
        }
    }

    pub fn missing_resolution(ast: &Ast, node: NodeId) -> Self {
        Self::MissingResolution {
            node,
            kind: ast.kind(node).label(),
            span: ast.span(node),
        }
    }

    /// Node the failure points at
    pub fn node(&self) -> NodeId {
        match self {
            Self::UnhandledNode { node, .. }
            | Self::UnhandledType { node, .. }
            | Self::MissingDefinition { node, .. }
            | Self::MissingResolution { node, .. }
            | Self::MacroArity { node, .. }
            | Self::MissingReceiver { node, .. }
            | Self::RecursiveMacro { node, .. } => *node,
        }
    }
}
