//! Fluent construction of resolved trees
//!
//! Children are created before their owner; adding the owner links the
//! children's `parent` slots. Resolver annotations are attached afterwards
//! with [`AstBuilder::bind`] and [`AstBuilder::resolve`], so forward
//! references are fine.

use crate::ast::*;
use crate::error::Result;
use crate::span::{ByteOffset, FileId, Span};

/// Arena builder for [`Ast`]
pub struct AstBuilder {
    nodes: Vec<Node>,
    file_id: FileId,
    current_offset: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            file_id: FileId::new(0),
            current_offset: 0,
        }
    }

    pub fn with_file_id(mut self, file_id: FileId) -> Self {
        self.file_id = file_id;
        self
    }

    /// Create a span for the current position
    pub fn span(&mut self) -> Span {
        let start = self.current_offset;
        self.current_offset += 1;
        Span::new(
            self.file_id,
            ByteOffset::new(start),
            ByteOffset::new(self.current_offset),
        )
    }

    pub fn name(&mut self, text: &str) -> Name {
        Name {
            text: text.to_string(),
            span: self.span(),
        }
    }

    /// Add a node, making it the parent of every child it owns
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        let span = self.span();
        self.nodes.push(Node {
            kind,
            parent: None,
            resolved: None,
            span,
        });
        id
    }

    /// Point a `Var` at its binding site
    pub fn bind(&mut self, var: NodeId, definition: NodeId) {
        if let NodeKind::Var(v) = &mut self.nodes[var.index()].kind {
            v.definition = Some(definition);
        }
    }

    /// Attach the semantic type of an expression
    pub fn resolve(&mut self, expr: NodeId, ty: NodeId) {
        self.nodes[expr.index()].resolved = Some(ty);
    }

    /// Wrap the top-level definitions in a root and hand out the tree
    pub fn finish(mut self, definitions: Vec<NodeId>) -> Result<Ast> {
        let root = self.add(NodeKind::Root(Root { definitions }));
        Ast::from_parts(self.nodes, root)
    }

    // Definitions

    pub fn package(&mut self, name: &str, definitions: Vec<NodeId>) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Package(Package { name, definitions }))
    }

    pub fn class(&mut self, name: &str, type_params: &[&str], definitions: Vec<NodeId>) -> NodeId {
        let def = self.class_def(name, type_params, definitions);
        self.add(NodeKind::Class(def))
    }

    pub fn interface(&mut self, name: &str, type_params: &[&str], definitions: Vec<NodeId>) -> NodeId {
        let def = self.class_def(name, type_params, definitions);
        self.add(NodeKind::Interface(def))
    }

    fn class_def(&mut self, name: &str, type_params: &[&str], definitions: Vec<NodeId>) -> ClassDef {
        let parameters = type_params
            .iter()
            .map(|param| {
                let name = self.name(param);
                self.add(NodeKind::TypeParam(TypeParam { name }))
            })
            .collect();
        ClassDef {
            name: self.name(name),
            parameters,
            definitions,
        }
    }

    pub fn primitive(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Primitive(Primitive { name }))
    }

    pub fn function(
        &mut self,
        name: &str,
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let def = FunctionDef {
            name: self.name(name),
            return_type,
            params,
            body,
        };
        self.add(NodeKind::Function(def))
    }

    pub fn method(
        &mut self,
        name: &str,
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let def = FunctionDef {
            name: self.name(name),
            return_type,
            params,
            body,
        };
        self.add(NodeKind::Method(def))
    }

    pub fn macro_def(&mut self, name: &str, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Macro(MacroDef { name, params, body }))
    }

    pub fn method_macro(&mut self, name: &str, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::MethodMacro(MacroDef { name, params, body }))
    }

    pub fn param(&mut self, ty: NodeId, name: &str) -> NodeId {
        self.declaration(ty, name, None)
    }

    pub fn declaration(&mut self, ty: NodeId, name: &str, value: Option<NodeId>) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Declaration(Declaration { ty, name, value }))
    }

    pub fn field(&mut self, ty: NodeId, name: &str, value: Option<NodeId>) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Field(Declaration { ty, name, value }))
    }

    // Types

    /// Dotted type path, e.g. `ty("java.lang.Object")`
    pub fn ty(&mut self, path: &str) -> NodeId {
        self.generic(path, Vec::new())
    }

    pub fn generic(&mut self, path: &str, parameters: Vec<NodeId>) -> NodeId {
        let path = path.split('.').map(|segment| self.name(segment)).collect();
        self.add(NodeKind::Type(TypeRef { path, parameters }))
    }

    // Statements

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Block(Block { statements }))
    }

    pub fn local(&mut self, declaration: NodeId) -> NodeId {
        self.add(NodeKind::Local(Local { declaration }))
    }

    pub fn ret(&mut self, expr: Option<NodeId>) -> NodeId {
        self.add(NodeKind::Return(Return { expr }))
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.add(NodeKind::ExprStmt(ExprStmt { expr }))
    }

    pub fn assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.add(NodeKind::Assign(Assign { lhs, rhs }))
    }

    pub fn if_stmt(&mut self, predicate: NodeId, consequence: NodeId, alternative: Option<NodeId>) -> NodeId {
        self.add(NodeKind::If(If {
            predicate,
            consequence,
            alternative,
        }))
    }

    // Expressions

    pub fn var(&mut self, name: &str) -> NodeId {
        let name = self.name(name);
        self.add(NodeKind::Var(Var { name, definition: None }))
    }

    /// `Var` already bound to `definition`
    pub fn var_to(&mut self, name: &str, definition: NodeId) -> NodeId {
        let var = self.var(name);
        self.bind(var, definition);
        var
    }

    pub fn call(&mut self, expr: NodeId, args: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Call(Call { expr, args }))
    }

    pub fn attr(&mut self, expr: NodeId, attr: &str) -> NodeId {
        let attr = self.name(attr);
        self.add(NodeKind::Attr(Attr { expr, attr }))
    }

    pub fn number(&mut self, text: &str) -> NodeId {
        self.add(NodeKind::Number(Literal { text: text.to_string() }))
    }

    /// String literal; `text` is the token including its quotes
    pub fn string(&mut self, text: &str) -> NodeId {
        self.add(NodeKind::String(Literal { text: text.to_string() }))
    }

    pub fn list(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::List(List { elements }))
    }

    pub fn native(&mut self, parts: Vec<NodeId>) -> NodeId {
        self.add(NodeKind::Native(Native { parts }))
    }

    pub fn fixed(&mut self, text: &str) -> NodeId {
        self.add(NodeKind::Fixed(Literal { text: text.to_string() }))
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_package_construction() {
        let mut b = AstBuilder::new();

        let int = b.primitive("int");
        let ty = b.ty("int");
        b.resolve(ty, int);
        let field = b.field(ty, "count", None);
        let class = b.class("Counter", &[], vec![field]);
        let package = b.package("demo", vec![class]);
        let ast = b.finish(vec![int, package]).unwrap();

        assert_eq!(ast.parent(field), Some(class));
        assert_eq!(ast.parent(class), Some(package));
        assert_eq!(ast.parent(package), Some(ast.root()));
        assert_eq!(ast.resolved(ty), Some(int));
        assert_eq!(ast.root_definitions(), &[int, package]);
    }

    #[test]
    fn test_class_type_parameters_are_children() {
        let mut b = AstBuilder::new();

        let class = b.class("Box", &["T", "U"], vec![]);
        let ast = b.finish(vec![class]).unwrap();

        match ast.kind(class) {
            NodeKind::Class(def) => {
                assert_eq!(def.parameters.len(), 2);
                for param in &def.parameters {
                    assert_eq!(ast.parent(*param), Some(class));
                }
            }
            other => panic!("Expected Class, found {}", other.label()),
        }
    }

    #[test]
    fn test_forward_binding() {
        let mut b = AstBuilder::new();

        let var = b.var("helper");
        let stmt = b.expr_stmt(var);
        let body = b.block(vec![stmt]);
        let main = b.function("main", None, vec![], Some(body));
        let helper = b.function("helper", None, vec![], None);
        b.bind(var, helper);
        let ast = b.finish(vec![main, helper]).unwrap();

        match ast.kind(var) {
            NodeKind::Var(v) => assert_eq!(v.definition, Some(helper)),
            other => panic!("Expected Var, found {}", other.label()),
        }
    }

    #[test]
    fn test_generic_type_path() {
        let mut b = AstBuilder::new();

        let arg = b.ty("int");
        let list = b.generic("util.List", vec![arg]);
        let ast = b.finish(vec![]).unwrap();

        match ast.kind(list) {
            NodeKind::Type(ty) => {
                let path: Vec<&str> = ty.path.iter().map(Name::as_str).collect();
                assert_eq!(path, vec!["util", "List"]);
                assert_eq!(ty.parameters, vec![arg]);
            }
            other => panic!("Expected Type, found {}", other.label()),
        }
        assert_eq!(ast.parent(arg), Some(list));
    }
}
