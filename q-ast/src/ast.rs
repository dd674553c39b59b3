//! Abstract Syntax Tree definitions for q Language
//!
//! The tree handed to a backend is already resolved: expression nodes carry
//! the definition node that is their semantic type (`Node::resolved`) and
//! every `Var` points at its binding site (`Var::definition`).
//!
//! Nodes live in an arena owned by [`Ast`] and refer to each other through
//! [`NodeId`]s, which makes parent links and cross references cheap and
//! keeps the whole tree serializable.

use crate::error::{AstError, Result};
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Index of a node inside an [`Ast`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub text: String,
    #[serde(default)]
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>) -> Self {
        Name {
            text: text.into(),
            span: Span::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub definitions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: Name,
    pub definitions: Vec<NodeId>,
}

/// Shared shape of classes and interfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: Name,
    #[serde(default)]
    pub parameters: Vec<NodeId>,
    pub definitions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: Name,
}

/// Shared shape of free functions and methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: Name,
    #[serde(default)]
    pub return_type: Option<NodeId>,
    pub params: Vec<NodeId>,
    #[serde(default)]
    pub body: Option<NodeId>,
}

/// Shared shape of macros and method macros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDef {
    pub name: Name,
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

/// Typed binding; used for parameters, fields and locals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub ty: NodeId,
    pub name: Name,
    #[serde(default)]
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Local {
    pub declaration: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    #[serde(default)]
    pub expr: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub predicate: NodeId,
    pub consequence: NodeId,
    #[serde(default)]
    pub alternative: Option<NodeId>,
}

/// Type path such as `List<int>` or `a.b.C`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub path: Vec<Name>,
    #[serde(default)]
    pub parameters: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub name: Name,
    #[serde(default)]
    pub definition: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub expr: NodeId,
    pub args: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attr {
    pub expr: NodeId,
    pub attr: Name,
}

/// Literal token text, emitted verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub elements: Vec<NodeId>,
}

/// Target-language snippet assembled from `Fixed` text and expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Native {
    pub parts: Vec<NodeId>,
}

/// Every node kind the resolver can produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    Root(Root),
    Package(Package),
    Class(ClassDef),
    Interface(ClassDef),
    Primitive(Primitive),
    TypeParam(TypeParam),
    Function(FunctionDef),
    Method(FunctionDef),
    Macro(MacroDef),
    MethodMacro(MacroDef),
    Declaration(Declaration),
    Field(Declaration),
    Block(Block),
    Local(Local),
    Return(Return),
    ExprStmt(ExprStmt),
    Assign(Assign),
    If(If),
    Type(TypeRef),
    Var(Var),
    Call(Call),
    Attr(Attr),
    Number(Literal),
    String(Literal),
    List(List),
    Native(Native),
    Fixed(Literal),
}

/// How a `Var` bound to a node must be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSite {
    /// Named definitions referenced by their bare name
    Definition,
    /// Parameters, fields and locals
    Declaration,
    /// Free functions, hosted by their package's holder type
    Function,
}

impl NodeKind {
    /// Variant name, for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root(_) => "Root",
            NodeKind::Package(_) => "Package",
            NodeKind::Class(_) => "Class",
            NodeKind::Interface(_) => "Interface",
            NodeKind::Primitive(_) => "Primitive",
            NodeKind::TypeParam(_) => "TypeParam",
            NodeKind::Function(_) => "Function",
            NodeKind::Method(_) => "Method",
            NodeKind::Macro(_) => "Macro",
            NodeKind::MethodMacro(_) => "MethodMacro",
            NodeKind::Declaration(_) => "Declaration",
            NodeKind::Field(_) => "Field",
            NodeKind::Block(_) => "Block",
            NodeKind::Local(_) => "Local",
            NodeKind::Return(_) => "Return",
            NodeKind::ExprStmt(_) => "ExprStmt",
            NodeKind::Assign(_) => "Assign",
            NodeKind::If(_) => "If",
            NodeKind::Type(_) => "Type",
            NodeKind::Var(_) => "Var",
            NodeKind::Call(_) => "Call",
            NodeKind::Attr(_) => "Attr",
            NodeKind::Number(_) => "Number",
            NodeKind::String(_) => "String",
            NodeKind::List(_) => "List",
            NodeKind::Native(_) => "Native",
            NodeKind::Fixed(_) => "Fixed",
        }
    }

    /// Nodes owned by this node, in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Root(root) => root.definitions.clone(),
            NodeKind::Package(package) => package.definitions.clone(),
            NodeKind::Class(class) | NodeKind::Interface(class) => class
                .parameters
                .iter()
                .chain(&class.definitions)
                .copied()
                .collect(),
            NodeKind::Function(function) | NodeKind::Method(function) => function
                .return_type
                .iter()
                .chain(&function.params)
                .chain(&function.body)
                .copied()
                .collect(),
            NodeKind::Macro(mac) | NodeKind::MethodMacro(mac) => {
                let mut children = mac.params.clone();
                children.push(mac.body);
                children
            }
            NodeKind::Declaration(decl) | NodeKind::Field(decl) => {
                std::iter::once(decl.ty).chain(decl.value).collect()
            }
            NodeKind::Block(block) => block.statements.clone(),
            NodeKind::Local(local) => vec![local.declaration],
            NodeKind::Return(ret) => ret.expr.into_iter().collect(),
            NodeKind::ExprStmt(stmt) => vec![stmt.expr],
            NodeKind::Assign(assign) => vec![assign.lhs, assign.rhs],
            NodeKind::If(stmt) => std::iter::once(stmt.predicate)
                .chain(std::iter::once(stmt.consequence))
                .chain(stmt.alternative)
                .collect(),
            NodeKind::Type(ty) => ty.parameters.clone(),
            NodeKind::Call(call) => std::iter::once(call.expr).chain(call.args.iter().copied()).collect(),
            NodeKind::Attr(attr) => vec![attr.expr],
            NodeKind::List(list) => list.elements.clone(),
            NodeKind::Native(native) => native.parts.clone(),
            NodeKind::Primitive(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Var(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::Fixed(_) => Vec::new(),
        }
    }

    /// Classify this node as the target of a `Var`
    pub fn binding_site(&self) -> Option<BindingSite> {
        match self {
            NodeKind::Declaration(_) | NodeKind::Field(_) => Some(BindingSite::Declaration),
            NodeKind::Function(_) => Some(BindingSite::Function),
            NodeKind::Package(_)
            | NodeKind::Class(_)
            | NodeKind::Interface(_)
            | NodeKind::Primitive(_)
            | NodeKind::TypeParam(_)
            | NodeKind::Method(_)
            | NodeKind::Macro(_)
            | NodeKind::MethodMacro(_) => Some(BindingSite::Definition),
            NodeKind::Root(_)
            | NodeKind::Block(_)
            | NodeKind::Local(_)
            | NodeKind::Return(_)
            | NodeKind::ExprStmt(_)
            | NodeKind::Assign(_)
            | NodeKind::If(_)
            | NodeKind::Type(_)
            | NodeKind::Var(_)
            | NodeKind::Call(_)
            | NodeKind::Attr(_)
            | NodeKind::Number(_)
            | NodeKind::String(_)
            | NodeKind::List(_)
            | NodeKind::Native(_)
            | NodeKind::Fixed(_) => None,
        }
    }

    /// Declared name, for named definitions
    pub fn name(&self) -> Option<&Name> {
        match self {
            NodeKind::Package(package) => Some(&package.name),
            NodeKind::Class(class) | NodeKind::Interface(class) => Some(&class.name),
            NodeKind::Primitive(primitive) => Some(&primitive.name),
            NodeKind::TypeParam(param) => Some(&param.name),
            NodeKind::Function(function) | NodeKind::Method(function) => Some(&function.name),
            NodeKind::Macro(mac) | NodeKind::MethodMacro(mac) => Some(&mac.name),
            NodeKind::Declaration(decl) | NodeKind::Field(decl) => Some(&decl.name),
            NodeKind::Var(var) => Some(&var.name),
            _ => None,
        }
    }
}

/// Arena slot: the node itself plus resolver annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Definition node that is this expression's semantic type
    #[serde(default)]
    pub resolved: Option<NodeId>,
    #[serde(default)]
    pub span: Span,
}

/// A complete resolved tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Assemble an arena, verify its references and link parents
    pub fn from_parts(nodes: Vec<Node>, root: NodeId) -> Result<Self> {
        let mut ast = Ast { nodes, root };
        ast.check()?;
        ast.relink_parents()?;
        Ok(ast)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Top-level definitions in source order
    pub fn root_definitions(&self) -> &[NodeId] {
        match &self.node(self.root).kind {
            NodeKind::Root(root) => &root.definitions,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` does not belong to this arena; ids are validated by `check`.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn resolved(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).resolved
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::new(index), node))
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: Some(id),
        }
    }

    /// Verify that the root and every reference stay inside the arena
    pub fn check(&self) -> Result<()> {
        let len = self.nodes.len();
        let in_range = |node: NodeId, reference: NodeId| {
            if reference.index() < len {
                Ok(())
            } else {
                Err(AstError::DanglingReference { node, reference, len })
            }
        };

        if self.root.index() >= len {
            return Err(AstError::DanglingReference {
                node: self.root,
                reference: self.root,
                len,
            });
        }
        if !matches!(self.node(self.root).kind, NodeKind::Root(_)) {
            return Err(AstError::InvalidRoot {
                root: self.root,
                found: self.kind(self.root).label(),
            });
        }

        for (id, node) in self.iter() {
            for child in node.kind.children() {
                in_range(id, child)?;
            }
            if let NodeKind::Var(Var { definition: Some(definition), .. }) = &node.kind {
                in_range(id, *definition)?;
            }
            if let Some(resolved) = node.resolved {
                in_range(id, resolved)?;
            }
        }
        Ok(())
    }

    /// Recompute every `parent` link from the child lists
    pub fn relink_parents(&mut self) -> Result<()> {
        let mut parents: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (id, node) in self.iter() {
            for child in node.kind.children() {
                if let Some(first) = parents[child.index()] {
                    return Err(AstError::SharedChild {
                        node: child,
                        first,
                        second: id,
                    });
                }
                parents[child.index()] = Some(id);
            }
        }
        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }

        // With single ownership, a chain longer than the arena means a cycle.
        for index in 0..self.nodes.len() {
            let id = NodeId::new(index);
            if self.ancestors(id).nth(self.nodes.len()).is_some() {
                return Err(AstError::Cycle { node: id });
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let ast: Ast = serde_json::from_str(json)?;
        Ast::from_parts(ast.nodes, ast.root)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a resolved tree written by an external resolver
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ast::from_json(&content)
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}
