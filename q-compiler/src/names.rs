//! Name rendering: identifiers, type paths and package qualification
//!
//! A [`Namer`] turns identifier nodes into target text. It consults an
//! optional scope (a macro expansion's parameter bindings) first and the
//! fixed built-in table second; anything unmapped renders as written.

use crate::error::RenderError;
use q_ast::{Ast, Name, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Mapping from source identifier to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Substitutions(BTreeMap<String, String>);

static EMPTY: Substitutions = Substitutions::new();

impl Substitutions {
    pub const fn new() -> Self {
        Substitutions(BTreeMap::new())
    }

    /// Built-in names of the source language and their Java counterparts
    pub fn java() -> Self {
        [
            ("self", "this"),
            ("int", "Integer"),
            ("List", "java.util.ArrayList"),
            ("Map", "java.util.HashMap"),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Option<String> {
        self.0.insert(from.into(), to.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Add every entry of `other`, replacing existing ones
    pub fn extend(&mut self, other: Substitutions) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, String)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Substitutions(iter.into_iter().collect())
    }
}

/// Renders names under a built-in table and an optional expansion scope
#[derive(Debug, Clone, Copy)]
pub struct Namer<'a> {
    builtins: &'a Substitutions,
    scope: Option<&'a Substitutions>,
}

impl<'a> Namer<'a> {
    /// Renders every name exactly as written
    pub fn base() -> Namer<'static> {
        Namer {
            builtins: &EMPTY,
            scope: None,
        }
    }

    pub fn new(builtins: &'a Substitutions) -> Self {
        Namer { builtins, scope: None }
    }

    /// Overlay `scope` on `builtins`; the scope wins on conflicts
    pub fn scoped(builtins: &'a Substitutions, scope: &'a Substitutions) -> Self {
        Namer {
            builtins,
            scope: Some(scope),
        }
    }

    pub fn lookup(&self, text: &str) -> Option<&'a str> {
        self.scope
            .and_then(|scope| scope.get(text))
            .or_else(|| self.builtins.get(text))
    }

    pub fn name(&self, name: &Name) -> String {
        match self.lookup(&name.text) {
            Some(replacement) => replacement.to_string(),
            None => name.text.clone(),
        }
    }

    /// `a.b.C`, or `a.b.C<X,Y>` when the type carries arguments
    pub fn render_type(&self, ast: &Ast, id: NodeId) -> Result<String> {
        let NodeKind::Type(ty) = ast.kind(id) else {
            return Err(RenderError::unhandled_node(ast, id, "a type"));
        };

        let path = ty
            .path
            .iter()
            .map(|segment| self.name(segment))
            .collect::<Vec<_>>()
            .join(".");
        if ty.parameters.is_empty() {
            return Ok(path);
        }

        let params = ty
            .parameters
            .iter()
            .map(|param| self.render_type(ast, *param))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}<{}>", path, params.join(",")))
    }

    /// Bare identifier of a `Var`, ignoring what it is bound to
    pub fn var(&self, ast: &Ast, id: NodeId) -> Result<String> {
        match ast.kind(id) {
            NodeKind::Var(var) => Ok(self.name(&var.name)),
            _ => Err(RenderError::unhandled_node(ast, id, "a variable")),
        }
    }

    /// Dotted name of the packages enclosing `id` (including `id` itself)
    pub fn package(&self, ast: &Ast, id: NodeId) -> Option<String> {
        let mut segments: Vec<String> = ast
            .ancestors(id)
            .filter_map(|node| match ast.kind(node) {
                NodeKind::Package(package) => Some(self.name(&package.name)),
                _ => None,
            })
            .collect();
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(segments.join("."))
    }
}

/// Directory of a dotted package name: `a.b` becomes `a/b`
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').collect()
}
